//! Sync bridge: keeps the host's persisted config in step with the session.
//!
//! # How it works (for beginners)
//!
//! The bridge has two halves connected by a `tokio::sync::watch` channel:
//!
//! ```text
//! Store commit ──► ConfigPublisher (observer) ──watch──► worker task ──► HostApi::set_config
//! ```
//!
//! A `watch` channel only ever holds the **newest** value.  If the user makes
//! five edits while one host write is still in flight, the worker wakes up
//! once afterwards and writes the fifth config; the three in between are
//! never sent.  The host therefore always ends up with the last committed
//! config, without a queue of stale writes.
//!
//! Writes are fire-and-forget from the editor's point of view.  A failed write
//! is retried with exponential backoff and, if it still fails, logged.  The
//! committed state is never rolled back.
//!
//! [`SyncBridge::shutdown`] unsubscribes the publisher, which drops the
//! channel's sender.  The worker then writes whatever config is still unseen
//! and exits, so no edit is lost on a clean shutdown.

use std::sync::Arc;
use std::time::Duration;

use signage_core::{Command, Config, EditorState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::host::HostApi;
use crate::application::session::EditorSession;
use crate::application::store::{StateObserver, SubscriptionId};
use crate::infrastructure::storage::settings::SyncSection;

/// Retry policy for one config write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first; `0` is treated as `1`.
    pub attempts: u32,
    /// Delay before the second attempt, doubled for each further attempt.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&SyncSection::default())
    }
}

impl From<&SyncSection> for RetryPolicy {
    fn from(sync: &SyncSection) -> Self {
        Self {
            attempts: sync.retry_attempts,
            backoff: sync.retry_backoff(),
        }
    }
}

/// Observer half: publishes the config after commits that touch it.
struct ConfigPublisher {
    tx: watch::Sender<Option<Config>>,
}

impl StateObserver for ConfigPublisher {
    fn on_commit(&mut self, command: &Command, state: &EditorState) {
        if !command.touches_config() {
            return;
        }
        debug!(command = command.name(), "Config change queued for host");
        self.tx.send_replace(Some(state.config.clone()));
    }
}

/// A running bridge attached to one session.
pub struct SyncBridge {
    subscription: SubscriptionId,
    worker: JoinHandle<()>,
}

impl SyncBridge {
    /// Subscribes a publisher to `session` and spawns the write worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn attach(session: &EditorSession, policy: RetryPolicy) -> Self {
        let (tx, rx) = watch::channel(None);
        let subscription = session.subscribe(Box::new(ConfigPublisher { tx })).await;
        let worker = tokio::spawn(run_worker(session.host(), rx, policy));
        Self {
            subscription,
            worker,
        }
    }

    /// Stops observing `session`, writes any pending config and waits for the
    /// worker to finish.
    pub async fn shutdown(self, session: &EditorSession) {
        session.unsubscribe(self.subscription).await;
        if let Err(e) = self.worker.await {
            error!("sync worker terminated abnormally: {e}");
        }
    }
}

async fn run_worker(
    host: Arc<dyn HostApi>,
    mut rx: watch::Receiver<Option<Config>>,
    policy: RetryPolicy,
) {
    // `changed` still yields an unseen value after the sender is dropped,
    // which is what makes shutdown flush.
    while rx.changed().await.is_ok() {
        let pending = rx.borrow_and_update().clone();
        if let Some(config) = pending {
            persist(host.as_ref(), &config, &rx, policy).await;
        }
    }
    debug!("Sync worker stopped");
}

/// Writes `config`, retrying per `policy`.  Gives up early when a newer
/// config is already waiting, since that one supersedes this write.
async fn persist(
    host: &dyn HostApi,
    config: &Config,
    rx: &watch::Receiver<Option<Config>>,
    policy: RetryPolicy,
) {
    let attempts = policy.attempts.max(1);
    let mut delay = policy.backoff;

    for attempt in 1..=attempts {
        match host.set_config(config).await {
            Ok(()) => {
                info!(
                    attempt,
                    groups = config.assignments.len(),
                    items = config.playlist.len(),
                    "Config persisted to host"
                );
                return;
            }
            Err(e) if attempt < attempts => {
                if rx.has_changed().unwrap_or(false) {
                    warn!("Config write failed, newer config pending: {e}");
                    return;
                }
                warn!(attempt, "Config write failed, retrying in {delay:?}: {e}");
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
            Err(e) => {
                error!(attempts, "Config write failed, giving up: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::host::{HostError, MockHostApi};
    use signage_core::{AssetCatalog, ConfigField, Rotation};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            backoff: Duration::from_millis(1),
        }
    }

    /// Mock host with an empty initial state.
    fn empty_host() -> MockHostApi {
        let mut host = MockHostApi::new();
        host.expect_ready().returning(|| Ok(()));
        host.expect_assets().returning(|| Ok(AssetCatalog::new()));
        host.expect_devices().returning(|| Ok(Vec::new()));
        host.expect_config().returning(|| Ok(Config::default()));
        host
    }

    #[test]
    fn test_retry_policy_follows_sync_settings() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.backoff, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_bridge_persists_last_committed_config() {
        // Arrange
        let written = Arc::new(Mutex::new(Vec::<Config>::new()));
        let sink = Arc::clone(&written);
        let mut host = empty_host();
        host.expect_set_config().returning(move |config| {
            sink.lock().unwrap().push(config.clone());
            Ok(())
        });
        let session = EditorSession::bootstrap(Arc::new(host)).await.unwrap();
        let bridge = SyncBridge::attach(&session, fast_policy(1)).await;

        // Act
        session
            .dispatch(Command::AddAssignment { screens: 2 })
            .await
            .unwrap();
        session
            .dispatch(Command::AddItem { layout: vec![1, 1] })
            .await
            .unwrap();
        session
            .dispatch(Command::SetConfig(ConfigField::Rotation(Rotation::Deg90)))
            .await
            .unwrap();
        bridge.shutdown(&session).await;

        // Assert
        let written = written.lock().unwrap();
        assert!(!written.is_empty());
        assert_eq!(written.last(), Some(&session.snapshot().await.config));
    }

    #[tokio::test]
    async fn test_catalog_refresh_is_not_persisted() {
        let mut host = empty_host();
        host.expect_set_config().never();
        let session = EditorSession::bootstrap(Arc::new(host)).await.unwrap();
        let bridge = SyncBridge::attach(&session, fast_policy(1)).await;

        session.refresh_assets(AssetCatalog::new()).await.unwrap();
        bridge.shutdown(&session).await;
    }

    #[tokio::test]
    async fn test_failed_write_is_retried_then_succeeds() {
        // Arrange: the first two writes fail
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut host = empty_host();
        host.expect_set_config().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(HostError::Write("busy".to_string()))
            } else {
                Ok(())
            }
        });
        let session = EditorSession::bootstrap(Arc::new(host)).await.unwrap();
        let bridge = SyncBridge::attach(&session, fast_policy(3)).await;

        // Act
        session
            .dispatch(Command::SetConfig(ConfigField::Audio(true)))
            .await
            .unwrap();
        bridge.shutdown(&session).await;

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_keep_local_state() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut host = empty_host();
        host.expect_set_config().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(HostError::Write("disk full".to_string()))
        });
        let session = EditorSession::bootstrap(Arc::new(host)).await.unwrap();
        let bridge = SyncBridge::attach(&session, fast_policy(2)).await;

        session
            .dispatch(Command::SetConfig(ConfigField::Audio(true)))
            .await
            .unwrap();
        bridge.shutdown(&session).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(session.snapshot().await.config.audio);
    }
}
