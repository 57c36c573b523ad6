//! EditorSession: the use cases a UI (or the CLI) drives.
//!
//! The session wraps the [`Store`] behind an async mutex so that commands from
//! several tasks are serialized and applied strictly in issue order.  It also
//! holds the [`HostApi`] port for the two flows that need the host:
//!
//! - [`EditorSession::bootstrap`] waits for the host, reads the catalog, the
//!   devices and the persisted config, and commits `Init`.
//! - [`EditorSession::pick_asset`] opens the host's asset chooser.
//!
//! # The asset picker (for beginners)
//!
//! The chooser is the only place where the session waits on the user.  The
//! store lock is **not** held while the chooser is open: the session reads the
//! slot's current asset, releases the lock, awaits the host, and then commits
//! exactly one `AssignAsset` (or nothing when the user cancelled).  Because
//! other commands may run in between, the indices are re-checked by the guard
//! when the answer arrives.  Only one chooser may be open at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signage_core::{AssetCatalog, AssetId, Command, EditorState, MIN_DURATION};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use super::guard::{self, CommandError};
use super::host::{ChooserOptions, HostApi, HostError};
use super::store::{StateObserver, Store, SubscriptionId};

/// Errors surfaced by session use cases.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("command rejected: {0}")]
    Rejected(#[from] CommandError),
    #[error("an asset chooser is already open")]
    PickerBusy,
    #[error("playlist item {0} has no suggested play time")]
    NoSuggestion(usize),
}

/// One editing session against one host.
pub struct EditorSession {
    store: Mutex<Store>,
    host: Arc<dyn HostApi>,
    picker_busy: AtomicBool,
}

/// Clears the picker flag however `pick_asset` returns.
struct PickerSlot<'a>(&'a AtomicBool);

impl Drop for PickerSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EditorSession {
    /// Waits for the host, loads its state and commits `Init`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Host`] when any host read fails.
    pub async fn bootstrap(host: Arc<dyn HostApi>) -> Result<Arc<Self>, SessionError> {
        host.ready().await?;
        let assets = host.assets().await?;
        let devices = host.devices().await?;
        let config = host.config().await?;

        info!(
            assets = assets.len(),
            devices = devices.len(),
            groups = config.assignments.len(),
            items = config.playlist.len(),
            "Editor session loaded"
        );

        let mut store = Store::new(EditorState::default());
        store.dispatch(Command::Init {
            assets,
            config,
            devices,
        })?;

        Ok(Arc::new(Self {
            store: Mutex::new(store),
            host,
            picker_busy: AtomicBool::new(false),
        }))
    }

    /// Validates and commits `command`, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Rejected`] when the guard refuses the command.
    pub async fn dispatch(&self, command: Command) -> Result<EditorState, SessionError> {
        let mut store = self.store.lock().await;
        Ok(store.dispatch(command)?.clone())
    }

    /// The host this session was bootstrapped from.
    pub fn host(&self) -> Arc<dyn HostApi> {
        Arc::clone(&self.host)
    }

    /// A copy of the committed state.
    pub async fn snapshot(&self) -> EditorState {
        self.store.lock().await.state().clone()
    }

    pub async fn subscribe(&self, observer: Box<dyn StateObserver>) -> SubscriptionId {
        self.store.lock().await.subscribe(observer)
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.lock().await.unsubscribe(id)
    }

    /// Replaces the asset catalog wholesale.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the result mirrors [`Self::dispatch`].
    pub async fn refresh_assets(&self, catalog: AssetCatalog) -> Result<(), SessionError> {
        info!(assets = catalog.len(), "Asset catalog refreshed");
        self.dispatch(Command::AssetsUpdate(catalog)).await?;
        Ok(())
    }

    /// Opens the asset chooser for slot `slot_idx` of item `item_idx`.
    ///
    /// Returns the chosen asset id, or `None` when the user cancelled (in
    /// which case nothing is committed).
    ///
    /// # Errors
    ///
    /// - [`SessionError::PickerBusy`] when another chooser is still open.
    /// - [`SessionError::Rejected`] when the slot does not exist, before or
    ///   after the chooser resolves.
    /// - [`SessionError::Host`] when the chooser itself fails.
    pub async fn pick_asset(
        &self,
        item_idx: usize,
        slot_idx: usize,
    ) -> Result<Option<AssetId>, SessionError> {
        if self.picker_busy.swap(true, Ordering::AcqRel) {
            return Err(SessionError::PickerBusy);
        }
        let _slot = PickerSlot(&self.picker_busy);

        let selected = {
            let store = self.store.lock().await;
            guard::check_slot(store.state(), item_idx, slot_idx)?;
            store.state().config.playlist[item_idx].content[slot_idx]
                .file
                .clone()
        };

        let Some(choice) = self
            .host
            .choose_asset(ChooserOptions::for_slot(selected))
            .await?
        else {
            info!(item_idx, slot_idx, "Asset chooser cancelled");
            return Ok(None);
        };

        // The chooser may offer assets pushed after the last catalog refresh.
        let known = self.store.lock().await.state().assets.contains_key(&choice.id);
        if !known {
            info!(asset = %choice.id, "Picked asset not in catalog, refreshing");
            let catalog = self.host.assets().await?;
            self.refresh_assets(catalog).await?;
        }

        self.dispatch(Command::AssignAsset {
            item_idx,
            slot_idx,
            asset_id: choice.id.clone(),
        })
        .await?;
        Ok(Some(choice.id))
    }

    /// Sets item `item_idx` to its suggested play time and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSuggestion`] when the item holds no video,
    /// already plays for the suggested time, or its shortest video is below
    /// the minimum play time.
    pub async fn use_suggested_duration(&self, item_idx: usize) -> Result<f64, SessionError> {
        let mut store = self.store.lock().await;
        let item = guard::check_item(store.state(), item_idx)?;
        let duration = store
            .state()
            .suggested_duration(item)
            .filter(|secs| *secs >= MIN_DURATION)
            .ok_or(SessionError::NoSuggestion(item_idx))?;

        store.dispatch(Command::UpdateDuration { item_idx, duration })?;
        Ok(duration)
    }
}
