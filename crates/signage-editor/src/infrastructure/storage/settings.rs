//! TOML-based persistence of the editor's local settings.
//!
//! Reads and writes [`EditorSettings`] to the platform-appropriate file:
//! - Windows:  `%APPDATA%\SignageEditor\settings.toml`
//! - Linux:    `~/.config/signage-editor/settings.toml`
//! - macOS:    `~/Library/Application Support/SignageEditor/settings.toml`
//!
//! Example file:
//!
//! ```toml
//! [editor]
//! log_level = "debug"
//!
//! [host]
//! directory = "/srv/signage/lobby"
//!
//! [sync]
//! retry_attempts = 5
//! retry_backoff_ms = 500
//! ```
//!
//! # Serde default values
//!
//! Every section and field has a default, so a missing file, a missing
//! section and a missing key all fall back to the values below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Settings schema types ─────────────────────────────────────────────────────

/// Top-level settings stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EditorSettings {
    #[serde(default)]
    pub editor: EditorSection,
    #[serde(default)]
    pub host: HostSection,
    #[serde(default)]
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorSection {
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where the file host lives when no directory is given on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HostSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// Retry policy for config writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSection {
    /// Total attempts per config write, including the first.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Delay before the second attempt; doubles on each further attempt.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl SyncSection {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    250
}

impl Default for EditorSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

// ── Settings repository ───────────────────────────────────────────────────────

/// Resolves the full path to the settings file.
///
/// # Errors
///
/// Returns [`SettingsError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn settings_file_path() -> Result<PathBuf, SettingsError> {
    platform_config_dir()
        .map(|dir| dir.join("settings.toml"))
        .ok_or(SettingsError::NoPlatformConfigDir)
}

/// Loads settings from the platform path, or defaults when the file is absent.
///
/// # Errors
///
/// See [`load_settings_from`].
pub fn load_settings() -> Result<EditorSettings, SettingsError> {
    load_settings_from(&settings_file_path()?)
}

/// Loads settings from `path`, returning defaults if the file does not exist.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system errors other than "not found",
/// and [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_settings_from(path: &Path) -> Result<EditorSettings, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EditorSettings::default()),
        Err(source) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `settings` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system failures or
/// [`SettingsError::Serialize`] if serialization fails.
pub fn save_settings_to(path: &Path, settings: &EditorSettings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(settings)?;
    std::fs::write(path, content).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the `SignageEditor` part.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("SignageEditor"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("signage-editor"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("SignageEditor")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("signage_settings_{}", Uuid::new_v4()))
    }

    #[test]
    fn test_default_settings_values() {
        let settings = EditorSettings::default();
        assert_eq!(settings.editor.log_level, "info");
        assert_eq!(settings.host.directory, None);
        assert_eq!(settings.sync.retry_attempts, 3);
        assert_eq!(settings.sync.retry_backoff(), Duration::from_millis(250));
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let settings: EditorSettings = toml::from_str("").expect("deserialize empty");
        assert_eq!(settings, EditorSettings::default());
    }

    #[test]
    fn test_partial_sync_section_keeps_other_defaults() {
        // Arrange
        let toml_str = r#"
[sync]
retry_attempts = 7
"#;

        // Act
        let settings: EditorSettings = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(settings.sync.retry_attempts, 7);
        assert_eq!(settings.sync.retry_backoff_ms, 250);
        assert_eq!(settings.editor.log_level, "info");
    }

    #[test]
    fn test_unset_host_directory_is_omitted_from_toml() {
        let toml_str = toml::to_string_pretty(&EditorSettings::default()).expect("serialize");
        assert!(!toml_str.contains("directory"));
    }

    #[test]
    fn test_load_settings_from_missing_file_returns_defaults() {
        let path = temp_dir().join("settings.toml");
        let settings = load_settings_from(&path).expect("missing file is not an error");
        assert_eq!(settings, EditorSettings::default());
    }

    #[test]
    fn test_load_settings_from_malformed_file_is_parse_error() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let result = load_settings_from(&path);

        assert!(matches!(result, Err(SettingsError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_and_load_round_trip_via_temp_dir() {
        // Arrange
        let dir = temp_dir();
        let path = dir.join("nested").join("settings.toml");
        let mut settings = EditorSettings::default();
        settings.editor.log_level = "debug".to_string();
        settings.host.directory = Some(PathBuf::from("/srv/signage"));
        settings.sync.retry_backoff_ms = 10;

        // Act
        save_settings_to(&path, &settings).expect("save");
        let loaded = load_settings_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, settings);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_settings_file_path_ends_with_settings_toml() {
        // NoPlatformConfigDir is acceptable in a stripped environment.
        if let Ok(path) = settings_file_path() {
            assert!(path.ends_with("settings.toml"), "got {path:?}");
        }
    }
}
