//! The command processor: every way the editor state can change.
//!
//! Each [`Command`] derives a complete new [`EditorState`] from the previous
//! one.  Application never partially mutates: the previous state is cloned,
//! the command is applied to the clone, and the clone is returned.
//!
//! Commands do not validate their payload against the state.  Index ranges,
//! minimum durations and layout sizes are checked by the caller before
//! dispatch (see `signage_editor::application::guard`).  An index the
//! processor cannot resolve leaves the state as it was.

use tracing::debug;

use super::catalog::{AssetCatalog, AssetId, Device};
use super::config::{Assignment, Config, PlaylistItem, Rotation};
use super::state::EditorState;

/// A typed setter for one top-level playback option of [`Config`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigField {
    Rotation(Rotation),
    Audio(bool),
    /// Seconds the player may delay applying a change.
    SyncedChanges(u32),
}

impl ConfigField {
    /// Config key this setter writes, as named on the wire.
    pub fn key(&self) -> &'static str {
        match self {
            ConfigField::Rotation(_) => "rotation",
            ConfigField::Audio(_) => "audio",
            ConfigField::SyncedChanges(_) => "synced_changes",
        }
    }

    fn write(self, config: &mut Config) {
        match self {
            ConfigField::Rotation(rotation) => config.rotation = rotation,
            ConfigField::Audio(audio) => config.audio = audio,
            ConfigField::SyncedChanges(secs) => config.synced_changes = secs,
        }
    }
}

/// Every mutation the editor supports.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replaces the whole session state (bootstrap).
    Init {
        assets: AssetCatalog,
        config: Config,
        devices: Vec<Device>,
    },
    /// Replaces the asset catalog.
    AssetsUpdate(AssetCatalog),
    /// Appends a blank item with one slot per spread.
    AddItem { layout: Vec<u32> },
    DeleteItem { item_idx: usize },
    AssignAsset {
        item_idx: usize,
        slot_idx: usize,
        asset_id: AssetId,
    },
    UpdateDuration { item_idx: usize, duration: f64 },
    /// Replaces the playlist wholesale (used for reordering).
    UpdatePlaylist(Vec<PlaylistItem>),
    /// Appends a group of `screens` unassigned single devices.
    AddAssignment { screens: u32 },
    /// Removes a group; removing the last one also clears the playlist.
    DeleteAssignment { assignment_idx: usize },
    UpdateSerial {
        assignment_idx: usize,
        device_idx: usize,
        serial: String,
    },
    SetConfig(ConfigField),
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init { .. } => "init",
            Command::AssetsUpdate(_) => "assets_update",
            Command::AddItem { .. } => "add_item",
            Command::DeleteItem { .. } => "delete_item",
            Command::AssignAsset { .. } => "assign_asset",
            Command::UpdateDuration { .. } => "update_duration",
            Command::UpdatePlaylist(_) => "update_playlist",
            Command::AddAssignment { .. } => "add_assignment",
            Command::DeleteAssignment { .. } => "delete_assignment",
            Command::UpdateSerial { .. } => "update_serial",
            Command::SetConfig(_) => "set_config",
        }
    }

    /// `true` when this command can change the persisted [`Config`].
    ///
    /// `Init` loads the config the host already holds and `AssetsUpdate` only
    /// touches the catalog, so neither needs to be written back.
    pub fn touches_config(&self) -> bool {
        !matches!(self, Command::Init { .. } | Command::AssetsUpdate(_))
    }
}

impl EditorState {
    /// Derives the state that results from applying `command` to `self`.
    pub fn apply(&self, command: &Command) -> EditorState {
        debug!(command = command.name(), "applying command");

        if let Command::Init {
            assets,
            config,
            devices,
        } = command
        {
            return EditorState::new(assets.clone(), devices.clone(), config.clone());
        }

        let mut next = self.clone();
        let config = &mut next.config;

        match command {
            Command::Init { .. } => {}
            Command::AssetsUpdate(assets) => next.assets = assets.clone(),
            Command::AddItem { layout } => {
                config.playlist.push(PlaylistItem::from_layout(layout));
            }
            Command::DeleteItem { item_idx } => {
                if *item_idx < config.playlist.len() {
                    config.playlist.remove(*item_idx);
                }
            }
            Command::AssignAsset {
                item_idx,
                slot_idx,
                asset_id,
            } => {
                if let Some(slot) = config
                    .playlist
                    .get_mut(*item_idx)
                    .and_then(|item| item.content.get_mut(*slot_idx))
                {
                    slot.file = Some(asset_id.clone());
                }
            }
            Command::UpdateDuration { item_idx, duration } => {
                if let Some(item) = config.playlist.get_mut(*item_idx) {
                    item.duration = *duration;
                }
            }
            Command::UpdatePlaylist(playlist) => config.playlist = playlist.clone(),
            Command::AddAssignment { screens } => {
                config.assignments.push(Assignment::with_screens(*screens));
            }
            Command::DeleteAssignment { assignment_idx } => {
                if *assignment_idx < config.assignments.len() {
                    config.assignments.remove(*assignment_idx);
                }
                // A playlist has no meaning without a target geometry.
                if config.assignments.is_empty() {
                    config.playlist.clear();
                }
            }
            Command::UpdateSerial {
                assignment_idx,
                device_idx,
                serial,
            } => {
                if let Some(device) = config
                    .assignments
                    .get_mut(*assignment_idx)
                    .and_then(|a| a.devices.get_mut(*device_idx))
                {
                    device.serial = serial.clone();
                }
            }
            Command::SetConfig(field) => field.write(config),
        }

        next
    }
}
