//! Read-only mirrors of the host's asset catalog and device list.
//!
//! The host owns both collections.  The editor only reads them to label slots,
//! compute suggested durations and offer devices for assignment; it never
//! edits them.  Refreshes replace the whole collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of an asset in the host's catalog.
///
/// Hosts may emit numeric ids; they are normalised to their decimal string.
pub type AssetId = String;

/// The asset catalog keyed by id.
///
/// A `BTreeMap` keeps listings (e.g. in the CLI chooser) in a stable order.
pub type AssetCatalog = BTreeMap<AssetId, Asset>;

/// Kind of media an asset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
    /// Any other host asset type (fonts, packages, ...); never playable in a slot.
    #[serde(other)]
    Other,
}

/// Host-provided metadata for an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Playback length in seconds (videos only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// One entry of the host's asset catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(deserialize_with = "deserialize_asset_id")]
    pub id: AssetId,
    /// Thumbnail URL.
    #[serde(default)]
    pub thumb: String,
    pub filetype: FileType,
    #[serde(default)]
    pub metadata: AssetMetadata,
}

impl Asset {
    /// Returns the clip length when this asset is a video with a known duration.
    pub fn video_duration(&self) -> Option<f64> {
        match self.filetype {
            FileType::Video => self.metadata.duration,
            _ => None,
        }
    }

    /// Short human-readable description used on content slots.
    pub fn label(&self) -> String {
        match (self.filetype, self.metadata.duration) {
            (FileType::Video, Some(duration)) => format!("Video ({duration:.1}s)"),
            (FileType::Video, None) => "Video".to_string(),
            _ => "Image".to_string(),
        }
    }
}

/// A physical device known to the host account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub serial: String,
    #[serde(default)]
    pub description: String,
    /// `true` when the device is already assigned to this setup on the host.
    #[serde(default)]
    pub assigned: bool,
}

/// One selectable device in a device selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOption {
    pub serial: String,
    pub text: String,
}

/// The choices offered when picking the device for a slot.
///
/// Rendered as: an "Unassigned" entry, then an "Assigned devices" group and an
/// "Other devices" group.  Empty groups are not shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceChoices {
    pub unassigned: DeviceOption,
    pub assigned: Vec<DeviceOption>,
    pub other: Vec<DeviceOption>,
}

impl DeviceChoices {
    pub const ASSIGNED_GROUP: &'static str = "Assigned devices";
    pub const OTHER_GROUP: &'static str = "Other devices";

    /// Builds the selector from the host device list, preserving host order.
    pub fn from_devices(devices: &[Device]) -> Self {
        let (assigned, other): (Vec<&Device>, Vec<&Device>) =
            devices.iter().partition(|d| d.assigned);
        let to_option = |d: &Device| DeviceOption {
            serial: d.serial.clone(),
            text: format!("{} ({})", d.description, d.serial),
        };
        Self {
            unassigned: DeviceOption {
                serial: String::new(),
                text: "Unassigned".to_string(),
            },
            assigned: assigned.into_iter().map(to_option).collect(),
            other: other.into_iter().map(to_option).collect(),
        }
    }

    /// Returns `(group label, options)` pairs for non-empty groups.
    pub fn groups(&self) -> Vec<(&'static str, &[DeviceOption])> {
        let mut groups = Vec::new();
        if !self.assigned.is_empty() {
            groups.push((Self::ASSIGNED_GROUP, self.assigned.as_slice()));
        }
        if !self.other.is_empty() {
            groups.push((Self::OTHER_GROUP, self.other.as_slice()));
        }
        groups
    }
}

/// Accepts an asset id written either as a JSON string or a JSON number.
pub(crate) fn deserialize_asset_id<'de, D>(deserializer: D) -> Result<AssetId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(serial: &str, description: &str, assigned: bool) -> Device {
        Device {
            serial: serial.to_string(),
            description: description.to_string(),
            assigned,
        }
    }

    #[test]
    fn test_asset_deserializes_numeric_id_as_string() {
        let json = r#"{"id": 42, "thumb": "https://cdn/42", "filetype": "video",
                       "metadata": {"duration": 7.5}}"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.id, "42");
        assert_eq!(asset.video_duration(), Some(7.5));
    }

    #[test]
    fn test_asset_with_unknown_filetype_is_other() {
        let json = r#"{"id": "f1", "filetype": "font"}"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.filetype, FileType::Other);
        assert_eq!(asset.video_duration(), None);
    }

    #[test]
    fn test_image_has_no_video_duration_even_with_metadata() {
        let json = r#"{"id": "i1", "filetype": "image", "metadata": {"duration": 3.0}}"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.video_duration(), None);
        assert_eq!(asset.label(), "Image");
    }

    #[test]
    fn test_video_label_shows_one_decimal() {
        let asset = Asset {
            id: "v".to_string(),
            thumb: String::new(),
            filetype: FileType::Video,
            metadata: AssetMetadata { duration: Some(12.34) },
        };
        assert_eq!(asset.label(), "Video (12.3s)");
    }

    #[test]
    fn test_device_choices_split_assigned_and_other_in_host_order() {
        let devices = vec![
            device("A1", "Lobby", false),
            device("B2", "Bar", true),
            device("C3", "Door", false),
        ];

        let choices = DeviceChoices::from_devices(&devices);

        assert_eq!(choices.unassigned.serial, "");
        assert_eq!(choices.unassigned.text, "Unassigned");
        assert_eq!(choices.assigned.len(), 1);
        assert_eq!(choices.assigned[0].text, "Bar (B2)");
        let other: Vec<_> = choices.other.iter().map(|o| o.serial.as_str()).collect();
        assert_eq!(other, ["A1", "C3"]);
    }

    #[test]
    fn test_device_choices_omit_empty_groups() {
        let choices = DeviceChoices::from_devices(&[device("A1", "Lobby", false)]);
        let groups = choices.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, DeviceChoices::OTHER_GROUP);

        assert!(DeviceChoices::from_devices(&[]).groups().is_empty());
    }
}
