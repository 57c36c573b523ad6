//! In-memory host.
//!
//! [`MemoryHost`] serves a catalog, a device list and a config held in
//! memory.  Every successful [`HostApi::set_config`] is recorded so callers can
//! inspect what would have been persisted.  Test hooks:
//!
//! - [`MemoryHost::fail_next_writes`] makes the next `n` writes fail.
//! - [`MemoryHost::queue_choice`] answers the next chooser request; a chooser
//!   opened with nothing queued waits until an answer arrives.
//! - [`MemoryHost::push_assets`] replaces the catalog and notifies
//!   [`HostApi::asset_updates`] subscribers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use signage_core::{AssetCatalog, AssetId, Config, Device};
use tokio::sync::{broadcast, Notify};
use tracing::debug;

use crate::application::host::{AssetRef, ChooserOptions, HostApi, HostError};

/// Capacity of the asset-update channel.
const UPDATE_CHANNEL_CAPACITY: usize = 16;

pub struct MemoryHost {
    assets: Mutex<AssetCatalog>,
    devices: Vec<Device>,
    config: Mutex<Config>,
    persisted: Mutex<Vec<Config>>,
    failing_writes: AtomicU32,
    choices: Mutex<VecDeque<Option<AssetId>>>,
    choice_ready: Notify,
    chooser_requests: Mutex<Vec<ChooserOptions>>,
    updates: broadcast::Sender<AssetCatalog>,
}

/// Recovers the data of a poisoned lock; the host holds no invariants across
/// a panic.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new(AssetCatalog::new(), Vec::new(), Config::default())
    }
}

impl MemoryHost {
    pub fn new(assets: AssetCatalog, devices: Vec<Device>, config: Config) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            assets: Mutex::new(assets),
            devices,
            config: Mutex::new(config),
            persisted: Mutex::new(Vec::new()),
            failing_writes: AtomicU32::new(0),
            choices: Mutex::new(VecDeque::new()),
            choice_ready: Notify::new(),
            chooser_requests: Mutex::new(Vec::new()),
            updates,
        }
    }

    /// Every config written so far, oldest first.
    pub fn persisted(&self) -> Vec<Config> {
        lock(&self.persisted).clone()
    }

    /// The most recently persisted config (or the initial one).
    pub fn stored_config(&self) -> Config {
        lock(&self.config).clone()
    }

    /// Makes the next `count` calls to `set_config` fail.
    pub fn fail_next_writes(&self, count: u32) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Answers the next chooser request: `Some(id)` selects, `None` cancels.
    pub fn queue_choice(&self, choice: Option<AssetId>) {
        lock(&self.choices).push_back(choice);
        self.choice_ready.notify_one();
    }

    /// Options of every chooser opened so far.
    pub fn chooser_requests(&self) -> Vec<ChooserOptions> {
        lock(&self.chooser_requests).clone()
    }

    /// Replaces the catalog and notifies subscribers.  Returns the number of
    /// subscribers that were notified.
    pub fn push_assets(&self, catalog: AssetCatalog) -> usize {
        *lock(&self.assets) = catalog.clone();
        self.updates.send(catalog).unwrap_or(0)
    }
}

#[async_trait]
impl HostApi for MemoryHost {
    async fn ready(&self) -> Result<(), HostError> {
        Ok(())
    }

    async fn assets(&self) -> Result<AssetCatalog, HostError> {
        Ok(lock(&self.assets).clone())
    }

    async fn devices(&self) -> Result<Vec<Device>, HostError> {
        Ok(self.devices.clone())
    }

    async fn config(&self) -> Result<Config, HostError> {
        Ok(lock(&self.config).clone())
    }

    async fn set_config(&self, config: &Config) -> Result<(), HostError> {
        let failing = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(HostError::Write("injected failure".to_string()));
        }
        *lock(&self.config) = config.clone();
        lock(&self.persisted).push(config.clone());
        debug!(writes = lock(&self.persisted).len(), "Memory host stored config");
        Ok(())
    }

    fn asset_updates(&self) -> broadcast::Receiver<AssetCatalog> {
        self.updates.subscribe()
    }

    async fn choose_asset(&self, options: ChooserOptions) -> Result<Option<AssetRef>, HostError> {
        lock(&self.chooser_requests).push(options);
        loop {
            let ready = self.choice_ready.notified();
            let next = lock(&self.choices).pop_front();
            if let Some(choice) = next {
                return Ok(choice.map(|id| AssetRef { id }));
            }
            ready.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_config_records_every_write() {
        let host = MemoryHost::default();
        let mut config = Config::default();
        config.audio = true;

        host.set_config(&Config::default()).await.unwrap();
        host.set_config(&config).await.unwrap();

        assert_eq!(host.persisted(), vec![Config::default(), config.clone()]);
        assert_eq!(host.config().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed_in_order() {
        let host = MemoryHost::default();
        host.fail_next_writes(1);

        let first = host.set_config(&Config::default()).await;
        let second = host.set_config(&Config::default()).await;

        assert!(matches!(first, Err(HostError::Write(_))));
        assert!(second.is_ok());
        assert_eq!(host.persisted().len(), 1);
    }

    #[tokio::test]
    async fn test_queued_choice_answers_chooser() {
        let host = MemoryHost::default();
        host.queue_choice(Some("a1".to_string()));
        host.queue_choice(None);

        let first = host.choose_asset(ChooserOptions::for_slot(None)).await.unwrap();
        let second = host.choose_asset(ChooserOptions::for_slot(None)).await.unwrap();

        assert_eq!(first, Some(AssetRef { id: "a1".to_string() }));
        assert_eq!(second, None);
        assert_eq!(host.chooser_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_push_assets_reaches_subscribers() {
        let host = MemoryHost::default();
        let mut rx = host.asset_updates();

        let notified = host.push_assets(AssetCatalog::new());

        assert_eq!(notified, 1);
        assert_eq!(rx.recv().await.unwrap(), AssetCatalog::new());
    }

    #[test]
    fn test_push_assets_without_subscribers_still_replaces_catalog() {
        let host = MemoryHost::default();
        assert_eq!(host.push_assets(AssetCatalog::new()), 0);
        let assets = tokio_test::block_on(host.assets()).unwrap();
        assert!(assets.is_empty());
    }
}
