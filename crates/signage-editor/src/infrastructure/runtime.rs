//! Wires a session to its host.
//!
//! [`start`] bootstraps an [`EditorSession`], attaches the [`SyncBridge`] and
//! spawns the asset pump: a task that turns the host's catalog notifications
//! into `AssetsUpdate` commits.  [`Running::shutdown`] stops the pump and
//! flushes the bridge.

use std::sync::Arc;

use signage_core::{AssetCatalog, EditorState};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::host::HostApi;
use crate::application::session::{EditorSession, SessionError};
use crate::infrastructure::storage::settings::EditorSettings;
use crate::infrastructure::sync_bridge::{RetryPolicy, SyncBridge};

/// A session with its bridge and asset pump running.
pub struct Running {
    session: Arc<EditorSession>,
    bridge: SyncBridge,
    pump: JoinHandle<()>,
}

/// Bootstraps a session on `host` and starts its background tasks.
///
/// # Errors
///
/// Returns [`SessionError::Host`] when bootstrap cannot read from the host.
pub async fn start(
    host: Arc<dyn HostApi>,
    settings: &EditorSettings,
) -> Result<Running, SessionError> {
    // Subscribe before bootstrap so no catalog pushed in between is missed.
    let updates = host.asset_updates();
    let session = EditorSession::bootstrap(host).await?;
    let bridge = SyncBridge::attach(&session, RetryPolicy::from(&settings.sync)).await;
    let pump = tokio::spawn(pump_assets(Arc::clone(&session), updates));

    info!("Editor runtime started");
    Ok(Running {
        session,
        bridge,
        pump,
    })
}

impl Running {
    pub fn session(&self) -> &Arc<EditorSession> {
        &self.session
    }

    /// Stops the asset pump, flushes pending config writes and returns the
    /// final state.
    pub async fn shutdown(self) -> EditorState {
        self.pump.abort();
        self.bridge.shutdown(&self.session).await;
        info!("Editor runtime stopped");
        self.session.snapshot().await
    }
}

async fn pump_assets(session: Arc<EditorSession>, mut updates: broadcast::Receiver<AssetCatalog>) {
    loop {
        match updates.recv().await {
            Ok(catalog) => {
                if let Err(e) = session.refresh_assets(catalog).await {
                    warn!("asset refresh failed: {e}");
                }
            }
            // Catalogs replace each other, so skipping stale ones is harmless.
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Asset pump lagged behind host notifications");
            }
            Err(RecvError::Closed) => {
                debug!("Host closed asset notifications");
                break;
            }
        }
    }
}
