//! The port the host environment implements.
//!
//! The editor never talks to a concrete host.  Everything it needs (the
//! readiness signal, the asset catalog, the device list, the persisted config,
//! config writes, asset-update notifications and the asset chooser) goes
//! through [`HostApi`].  Adapters live in `infrastructure::host`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use signage_core::{AssetCatalog, AssetId, Config, Device, FileType};
use thiserror::Error;
use tokio::sync::broadcast;

/// Failures reported by a host adapter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    #[error("host is not available: {0}")]
    Unavailable(String),
    #[error("failed to read from host: {0}")]
    Read(String),
    #[error("failed to write to host: {0}")]
    Write(String),
    #[error("asset chooser failed: {0}")]
    Chooser(String),
}

/// Options passed to the host's asset chooser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChooserOptions {
    /// File types the chooser may offer.
    pub filter: Vec<FileType>,
    /// Asset currently in the slot, pre-selected in the chooser.
    pub selected_asset_id: Option<AssetId>,
    /// Hide assets that live on devices rather than in the account.
    pub exclude_node_assets: bool,
}

impl ChooserOptions {
    /// Options for filling a content slot: images and videos only, account
    /// assets only.
    pub fn for_slot(selected_asset_id: Option<AssetId>) -> Self {
        Self {
            filter: vec![FileType::Image, FileType::Video],
            selected_asset_id,
            exclude_node_assets: true,
        }
    }
}

/// The chooser's answer when the user selects an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: AssetId,
}

/// Everything the editor needs from its host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Resolves once the host can serve the calls below.
    async fn ready(&self) -> Result<(), HostError>;

    async fn assets(&self) -> Result<AssetCatalog, HostError>;

    async fn devices(&self) -> Result<Vec<Device>, HostError>;

    /// The persisted config (defaults when nothing was persisted yet).
    async fn config(&self) -> Result<Config, HostError>;

    /// Persists `config`, replacing what was stored.
    async fn set_config(&self, config: &Config) -> Result<(), HostError>;

    /// Receiver of replacement catalogs pushed by the host.
    fn asset_updates(&self) -> broadcast::Receiver<AssetCatalog>;

    /// Opens the asset chooser and waits for the user.
    ///
    /// `Ok(None)` means the user cancelled.
    async fn choose_asset(&self, options: ChooserOptions) -> Result<Option<AssetRef>, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_chooser_offers_images_and_videos_only() {
        let options = ChooserOptions::for_slot(Some("a1".to_string()));
        assert_eq!(options.filter, vec![FileType::Image, FileType::Video]);
        assert_eq!(options.selected_asset_id.as_deref(), Some("a1"));
        assert!(options.exclude_node_assets);
    }

    #[test]
    fn test_host_error_messages_name_the_operation() {
        assert_eq!(
            HostError::Write("disk full".to_string()).to_string(),
            "failed to write to host: disk full"
        );
    }
}
