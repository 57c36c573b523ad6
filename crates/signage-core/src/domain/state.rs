//! The editor's whole session state.
//!
//! [`EditorState`] bundles the persisted [`Config`] with read-only mirrors of
//! the host's asset catalog and device list.  Getters that need the catalog
//! (suggested durations, slot labels) or the devices (device selector) live
//! here rather than on `Config`.

use super::catalog::{AssetCatalog, Device, DeviceChoices};
use super::config::{Assignment, Config, PlaylistItem};
use super::geometry;

/// Config plus the host-provided collections it refers to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub assets: AssetCatalog,
    pub devices: Vec<Device>,
    pub config: Config,
}

impl EditorState {
    pub fn new(assets: AssetCatalog, devices: Vec<Device>, config: Config) -> Self {
        Self {
            assets,
            devices,
            config,
        }
    }

    /// Play time matching the shortest video in `item`.
    ///
    /// Playback must not outrun the shortest clip, so the minimum is used.
    /// Returns `None` when the item holds no video (with a known duration) or
    /// when the item already plays for exactly that long.
    pub fn suggested_duration(&self, item: &PlaylistItem) -> Option<f64> {
        let shortest = item
            .content
            .iter()
            .filter_map(|slot| slot.file.as_ref())
            .filter_map(|id| self.assets.get(id))
            .filter_map(|asset| asset.video_duration())
            .reduce(f64::min)?;

        if shortest == item.duration {
            return None;
        }
        Some(shortest)
    }

    /// Label shown on a content slot: `"Video (7.5s)"`, `"Image"` or `"Blank"`.
    ///
    /// A file that is not (or no longer) in the catalog is shown as blank.
    pub fn slot_label(&self, file: Option<&str>) -> String {
        file.and_then(|id| self.assets.get(id))
            .map_or_else(|| "Blank".to_string(), |asset| asset.label())
    }

    /// Width percentages of each content slot of `item`.
    ///
    /// Empty when there is no screen group to lay the item out on.
    pub fn slot_widths(&self, item: &PlaylistItem) -> Vec<f64> {
        let size = self.config.size();
        item.content
            .iter()
            .filter_map(|slot| geometry::slot_width_percent(size, slot.spread))
            .collect()
    }

    /// Width percentages of each device of `assignment`, measured against the
    /// canvas size.
    pub fn device_widths(&self, assignment: &Assignment) -> Vec<f64> {
        let size = self.config.size();
        assignment
            .devices
            .iter()
            .filter_map(|device| geometry::slot_width_percent(size, device.layout.units()))
            .collect()
    }

    /// Device selector entries built from the host device list.
    pub fn device_choices(&self) -> DeviceChoices {
        DeviceChoices::from_devices(&self.devices)
    }

    /// `true` when `serial` is empty (unassigned) or names a known device.
    pub fn knows_serial(&self, serial: &str) -> bool {
        serial.is_empty() || self.devices.iter().any(|d| d.serial == serial)
    }

    /// The playlist with item `from` moved to position `to`.
    ///
    /// This is the ordering a drag-and-drop reorder produces; commit it with
    /// `Command::UpdatePlaylist`.  Returns `None` when either index is out of
    /// range.
    pub fn move_item(&self, from: usize, to: usize) -> Option<Vec<PlaylistItem>> {
        let len = self.config.playlist.len();
        if from >= len || to >= len {
            return None;
        }
        let mut playlist = self.config.playlist.clone();
        let item = playlist.remove(from);
        playlist.insert(to, item);
        Some(playlist)
    }
}
