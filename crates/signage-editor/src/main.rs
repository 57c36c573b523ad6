//! Signage editor: headless command-line front end.
//!
//! Each invocation bootstraps a session from a host directory, performs one
//! editing action and flushes the resulting config back to the directory
//! before exiting.
//!
//! # Usage
//!
//! ```text
//! signage-editor [--host-dir <DIR>] [--settings <FILE>] <COMMAND>
//!
//! Commands:
//!   show                          Print groups, playlist and playback options
//!   add-group <SCREENS>           Create a screen group of 1-4 screens
//!   delete-group <GROUP>
//!   set-serial <GROUP> <DEVICE> [SERIAL]   Assign a device (omit to unassign)
//!   add-item <LAYOUT>             e.g. "1:1" or "2"
//!   delete-item <ITEM>
//!   assign <ITEM> <SLOT> <ASSET>
//!   pick <ITEM> <SLOT>            Choose an asset interactively
//!   duration <ITEM> <SECONDS>
//!   use-suggested <ITEM>          Match play time to the shortest video
//!   move-item <FROM> <TO>
//!   rotation <DEGREES>            0, 90, 180 or 270
//!   audio <on|off>
//!   synced-changes <SECONDS>
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable            | Description                              |
//! |---------------------|------------------------------------------|
//! | `SIGNAGE_HOST_DIR`  | Host directory (overrides settings file) |
//! | `SIGNAGE_SETTINGS`  | Path of the settings file                |
//! | `RUST_LOG`          | Log filter (overrides `log_level`)       |

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use signage_core::domain::config::{ROTATION_OPTIONS, SYNCED_CHANGE_OPTIONS};
use signage_core::domain::geometry::{format_layout, parse_layout};
use signage_core::{Command, ConfigField, EditorState, Rotation, MIN_DURATION};
use signage_editor::infrastructure::host::FileHost;
use signage_editor::infrastructure::runtime;
use signage_editor::infrastructure::storage::settings::{self, EditorSettings, SettingsError};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Edit a multi-screen signage configuration stored in a host directory.
#[derive(Debug, Parser)]
#[command(name = "signage-editor", version)]
struct Cli {
    /// Directory holding assets.json, devices.json and config.json.
    #[arg(long, env = "SIGNAGE_HOST_DIR")]
    host_dir: Option<PathBuf>,

    /// Settings file to use instead of the platform default.
    #[arg(long, env = "SIGNAGE_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
enum Action {
    /// Print the current configuration.
    Show,
    /// Create a screen group.
    AddGroup { screens: u32 },
    DeleteGroup { group: usize },
    /// Assign a device serial to a slot of a screen group.
    SetSerial {
        group: usize,
        device: usize,
        /// Omit to leave the slot unassigned.
        serial: Option<String>,
    },
    /// Append a playlist item with the given layout.
    AddItem { layout: String },
    DeleteItem { item: usize },
    /// Put an asset into a content slot.
    Assign {
        item: usize,
        slot: usize,
        asset: String,
    },
    /// Open the asset chooser for a content slot.
    Pick { item: usize, slot: usize },
    /// Set the play time of an item, in seconds.
    Duration { item: usize, seconds: f64 },
    /// Set the play time of an item to its shortest video.
    UseSuggested { item: usize },
    /// Reorder the playlist.
    MoveItem { from: usize, to: usize },
    /// Display rotation in degrees.
    Rotation { degrees: u16 },
    Audio {
        #[arg(value_parser = parse_switch, action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Seconds the players may wait before applying a change.
    SyncedChanges { seconds: u32 },
}

fn parse_switch(text: &str) -> Result<bool, String> {
    match text {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(format!("expected on or off, got {other:?}")),
    }
}

/// What one invocation does once the session is running.
#[derive(Debug, PartialEq)]
enum Step {
    Show,
    Pick { item: usize, slot: usize },
    UseSuggested { item: usize },
    Dispatch(Command),
}

impl Action {
    /// Resolves the action against the loaded state.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed layouts, unsupported rotations and
    /// out-of-range reorders.  Everything else is validated by the session.
    fn into_step(self, state: &EditorState) -> anyhow::Result<Step> {
        let command = match self {
            Action::Show => return Ok(Step::Show),
            Action::Pick { item, slot } => return Ok(Step::Pick { item, slot }),
            Action::UseSuggested { item } => return Ok(Step::UseSuggested { item }),
            Action::AddGroup { screens } => Command::AddAssignment { screens },
            Action::DeleteGroup { group } => Command::DeleteAssignment {
                assignment_idx: group,
            },
            Action::SetSerial {
                group,
                device,
                serial,
            } => Command::UpdateSerial {
                assignment_idx: group,
                device_idx: device,
                serial: serial.unwrap_or_default(),
            },
            Action::AddItem { layout } => Command::AddItem {
                layout: parse_layout(&layout)?,
            },
            Action::DeleteItem { item } => Command::DeleteItem { item_idx: item },
            Action::Assign { item, slot, asset } => Command::AssignAsset {
                item_idx: item,
                slot_idx: slot,
                asset_id: asset,
            },
            Action::Duration { item, seconds } => Command::UpdateDuration {
                item_idx: item,
                duration: seconds,
            },
            Action::MoveItem { from, to } => match state.move_item(from, to) {
                Some(playlist) => Command::UpdatePlaylist(playlist),
                None => bail!(
                    "cannot move item {from} to {to}: playlist has {} items",
                    state.config.playlist.len()
                ),
            },
            Action::Rotation { degrees } => {
                Command::SetConfig(ConfigField::Rotation(Rotation::try_from(degrees)?))
            }
            Action::Audio { enabled } => Command::SetConfig(ConfigField::Audio(enabled)),
            Action::SyncedChanges { seconds } => {
                Command::SetConfig(ConfigField::SyncedChanges(seconds))
            }
        };
        Ok(Step::Dispatch(command))
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn render(state: &EditorState) -> String {
    let config = &state.config;
    let mut out = String::new();

    if let Some(hint) = config.editor_hint() {
        let _ = writeln!(out, "{hint}\n");
    }

    let _ = writeln!(out, "Screen groups (canvas size {}):", config.size());
    let choices = state.device_choices();
    for (g, assignment) in config.assignments.iter().enumerate() {
        let _ = writeln!(out, "  [{g}] {} units", assignment.units());
        for (d, device) in assignment.devices.iter().enumerate() {
            let name = [&choices.assigned, &choices.other]
                .into_iter()
                .flatten()
                .find(|option| option.serial == device.serial)
                .map_or_else(|| choices.unassigned.text.clone(), |o| o.text.clone());
            let _ = writeln!(out, "      [{d}] {:?} {name}", device.layout);
        }
    }
    for option in config.possible_assignments() {
        let _ = writeln!(out, "  + {} (add-group {})", option.text, option.screens);
    }

    let _ = writeln!(out, "\nPlaylist:");
    for (i, item) in config.playlist.iter().enumerate() {
        let stale = if item.fits(config.size()) { "" } else { " (does not fit canvas)" };
        let _ = writeln!(
            out,
            "  [{i}] {} {}s{stale}",
            format_layout(&item.layout()),
            item.duration
        );
        for (s, slot) in item.content.iter().enumerate() {
            let _ = writeln!(
                out,
                "      [{s}] {} {}",
                slot.file.as_deref().unwrap_or("-"),
                state.slot_label(slot.file.as_deref())
            );
        }
        // Videos shorter than the minimum play time cannot be suggested.
        if let Some(suggested) = state
            .suggested_duration(item)
            .filter(|secs| *secs >= MIN_DURATION)
        {
            let _ = writeln!(out, "      suggested play time: {suggested}s (use-suggested {i})");
        }
    }
    if let Ok(layouts) = config.layouts() {
        let offered: Vec<_> = layouts.iter().map(|l| format_layout(l)).collect();
        if !offered.is_empty() {
            let _ = writeln!(out, "  + layouts: {}", offered.join(", "));
        }
    }

    let rotation = ROTATION_OPTIONS
        .iter()
        .find(|(r, _)| *r == config.rotation)
        .map_or("?", |(_, text)| *text);
    let synced = SYNCED_CHANGE_OPTIONS
        .iter()
        .find(|(secs, _)| *secs == config.synced_changes)
        .map_or_else(|| format!("{}s", config.synced_changes), |(_, text)| text.to_string());
    let _ = writeln!(out, "\nRotation: {rotation}");
    let _ = writeln!(out, "Audio: {}", if config.audio { "on" } else { "off" });
    let _ = writeln!(out, "Synced changes: {synced}");
    out
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Falls back to defaults when the platform settings file is unusable,
/// handing back the error so it can be logged once tracing is up.
fn settings_or_default(
    loaded: Result<EditorSettings, SettingsError>,
) -> (EditorSettings, Option<SettingsError>) {
    match loaded {
        Ok(settings) => (settings, None),
        Err(e) => (EditorSettings::default(), Some(e)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (settings, settings_err) = match &cli.settings {
        Some(path) => (
            settings::load_settings_from(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None,
        ),
        None => settings_or_default(settings::load_settings()),
    };

    // `RUST_LOG` wins; otherwise the settings file's level applies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.editor.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
    if let Some(e) = settings_err {
        warn!("Ignoring unreadable settings file, using defaults: {e}");
    }

    let Some(host_dir) = cli.host_dir.or_else(|| settings.host.directory.clone()) else {
        bail!("no host directory: pass --host-dir, set SIGNAGE_HOST_DIR or [host] directory");
    };
    info!(host = %host_dir.display(), "Signage editor starting");

    let host = Arc::new(FileHost::new(&host_dir));
    let running = runtime::start(host, &settings)
        .await
        .with_context(|| format!("failed to open host directory {}", host_dir.display()))?;
    let session = Arc::clone(running.session());

    let step = cli.action.into_step(&session.snapshot().await);
    let outcome = match step {
        Ok(Step::Show) => Ok(render(&session.snapshot().await)),
        Ok(Step::Pick { item, slot }) => match session.pick_asset(item, slot).await {
            Ok(Some(id)) => Ok(format!("assigned {id} to item {item} slot {slot}")),
            Ok(None) => Ok("cancelled".to_string()),
            Err(e) => Err(anyhow::Error::new(e)),
        },
        Ok(Step::UseSuggested { item }) => session
            .use_suggested_duration(item)
            .await
            .map(|secs| format!("item {item} now plays for {secs}s"))
            .map_err(anyhow::Error::new),
        Ok(Step::Dispatch(command)) => {
            let name = command.name();
            session
                .dispatch(command)
                .await
                .map(|state| render(&state))
                .with_context(|| format!("{name} failed"))
        }
        Err(e) => Err(e),
    };

    // Flush before reporting, so a rejected command still leaves earlier
    // pending writes persisted.
    running.shutdown().await;
    println!("{}", outcome?);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
