//! File-system host: a directory of JSON files.
//!
//! ```text
//! <dir>/
//!   assets.json    { "<id>": { "id": ..., "thumb": ..., "filetype": ..., "metadata": {...} }, ... }
//!   devices.json   [ { "serial": ..., "description": ..., "assigned": ... }, ... ]
//!   config.json    the persisted signage config
//! ```
//!
//! A missing `assets.json` or `devices.json` reads as empty, a missing
//! `config.json` as the default config.  Config writes go to a temporary file
//! first and are then renamed over `config.json`, so a crash mid-write never
//! leaves a truncated config behind.
//!
//! The asset chooser lists the matching assets on stdout and reads an id from
//! stdin; an empty line or end of input cancels.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use signage_core::{AssetCatalog, Config, Device};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::application::host::{AssetRef, ChooserOptions, HostApi, HostError};

pub const ASSETS_FILE: &str = "assets.json";
pub const DEVICES_FILE: &str = "devices.json";
pub const CONFIG_FILE: &str = "config.json";

const UPDATE_CHANNEL_CAPACITY: usize = 16;

pub struct FileHost {
    dir: PathBuf,
    updates: broadcast::Sender<AssetCatalog>,
}

impl FileHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            dir: dir.into(),
            updates,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Re-reads `assets.json` and broadcasts it to `asset_updates` receivers.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Read`] when the file exists but cannot be read or
    /// parsed.
    pub async fn reload_assets(&self) -> Result<AssetCatalog, HostError> {
        let catalog = self.assets().await?;
        // No receivers is not an error: nobody is listening yet.
        let _ = self.updates.send(catalog.clone());
        Ok(catalog)
    }

    async fn read_json_or_default<T>(&self, name: &str) -> Result<T, HostError>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| HostError::Read(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = %path.display(), "Host file absent, using default");
                Ok(T::default())
            }
            Err(e) => Err(HostError::Read(format!("{}: {e}", path.display()))),
        }
    }
}

#[async_trait]
impl HostApi for FileHost {
    async fn ready(&self) -> Result<(), HostError> {
        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(HostError::Unavailable(format!(
                "{} is not a directory",
                self.dir.display()
            ))),
            Err(e) => Err(HostError::Unavailable(format!(
                "{}: {e}",
                self.dir.display()
            ))),
        }
    }

    async fn assets(&self) -> Result<AssetCatalog, HostError> {
        self.read_json_or_default(ASSETS_FILE).await
    }

    async fn devices(&self) -> Result<Vec<Device>, HostError> {
        self.read_json_or_default(DEVICES_FILE).await
    }

    async fn config(&self) -> Result<Config, HostError> {
        self.read_json_or_default(CONFIG_FILE).await
    }

    async fn set_config(&self, config: &Config) -> Result<(), HostError> {
        let bytes =
            serde_json::to_vec_pretty(config).map_err(|e| HostError::Write(e.to_string()))?;
        let path = self.dir.join(CONFIG_FILE);
        let tmp = self.dir.join(format!("{CONFIG_FILE}.tmp"));

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| HostError::Write(format!("{}: {e}", tmp.display())))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(HostError::Write(format!("{}: {e}", path.display())));
        }

        info!(file = %path.display(), bytes = bytes.len(), "Config written");
        Ok(())
    }

    fn asset_updates(&self) -> broadcast::Receiver<AssetCatalog> {
        self.updates.subscribe()
    }

    async fn choose_asset(&self, options: ChooserOptions) -> Result<Option<AssetRef>, HostError> {
        let catalog = self.assets().await?;
        let mut stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        prompt_choice(&catalog, &options, &mut stdin, &mut stdout).await
    }
}

/// Lists the assets `options` allows on `out` and reads the chosen id from
/// `input`.
///
/// # Errors
///
/// Returns [`HostError::Chooser`] on I/O failure, when nothing matches the
/// filter, or when the typed id is not one of the listed assets.
pub async fn prompt_choice<R, W>(
    catalog: &AssetCatalog,
    options: &ChooserOptions,
    input: &mut R,
    out: &mut W,
) -> Result<Option<AssetRef>, HostError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let chooser_err = |e: std::io::Error| HostError::Chooser(e.to_string());

    let offered: Vec<_> = catalog
        .values()
        .filter(|asset| options.filter.contains(&asset.filetype))
        .collect();
    if offered.is_empty() {
        return Err(HostError::Chooser("no matching assets".to_string()));
    }

    let mut listing = String::new();
    for asset in &offered {
        let marker = if options.selected_asset_id.as_deref() == Some(asset.id.as_str()) {
            '*'
        } else {
            ' '
        };
        listing.push_str(&format!("{marker} {:<24} {}\n", asset.id, asset.label()));
    }
    listing.push_str("asset id (empty to cancel): ");
    out.write_all(listing.as_bytes()).await.map_err(chooser_err)?;
    out.flush().await.map_err(chooser_err)?;

    let mut line = String::new();
    input.read_line(&mut line).await.map_err(chooser_err)?;
    let id = line.trim();
    if id.is_empty() {
        return Ok(None);
    }
    if !offered.iter().any(|asset| asset.id == id) {
        return Err(HostError::Chooser(format!("{id:?} is not one of the listed assets")));
    }
    Ok(Some(AssetRef { id: id.to_string() }))
}
