//! The persisted signage configuration.
//!
//! [`Config`] is the document the host stores and the device player reads.
//! It holds the screen groups (`assignments`), the playlist, and a few
//! playback options.  Everything else the editor shows (group size, aspect
//! ratio, the layouts and group sizes to offer) is derived from it by the
//! getters on [`Config`].
//!
//! # Wire format
//!
//! Field names are snake_case and `rotation` is an integer in degrees.  A
//! blank content slot is written as the legacy filename `"empty.png"` so that
//! configs remain readable by existing players; on read, `"empty.png"`,
//! `null`, `""` or a missing `file` all mean "no asset".

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::AssetId;
use super::geometry::{self, GeometryError, LANDSCAPE_RATIO};

/// Shortest allowed play time of a playlist item, in seconds.
pub const MIN_DURATION: f64 = 2.0;

/// Play time given to newly added playlist items, in seconds.
pub const DEFAULT_DURATION: f64 = 10.0;

/// Legacy filename standing in for "no asset" on the wire.
const BLANK_FILE: &str = "empty.png";

/// Group sizes offered when no screen group exists yet.
const STARTER_GROUPS: [AssignmentOption; 3] = [
    AssignmentOption {
        screens: 2,
        text: "Create two screens group",
    },
    AssignmentOption {
        screens: 3,
        text: "Create three screens group",
    },
    AssignmentOption {
        screens: 4,
        text: "Create four screens group",
    },
];

/// Display rotations offered by the playback options.
pub const ROTATION_OPTIONS: [(Rotation, &str); 4] = [
    (Rotation::None, "None"),
    (Rotation::Deg90, "90°"),
    (Rotation::Deg180, "180°"),
    (Rotation::Deg270, "270°"),
];

/// Change synchronisation delays (seconds) offered by the playback options.
pub const SYNCED_CHANGE_OPTIONS: [(u32, &str); 3] = [
    (0, "Update as fast as possible"),
    (45, "Wait around 60 seconds"),
    (105, "Wait around 2 minutes"),
];

/// A rotation value outside {0, 90, 180, 270}.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("rotation must be one of 0, 90, 180 or 270 degrees (got {0})")]
pub struct InvalidRotation(pub u16);

/// Display rotation applied by the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// `true` when the screens are turned on their side.
    pub fn is_portrait(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = InvalidRotation;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// How many content slots a physical device spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceLayout {
    #[default]
    Single,
    Double,
}

impl DeviceLayout {
    /// Geometry units contributed by a device with this layout.
    pub fn units(self) -> u32 {
        match self {
            DeviceLayout::Single => 1,
            DeviceLayout::Double => 2,
        }
    }
}

/// One physical screen position inside a group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSlot {
    /// Serial of the device shown here; empty when unassigned.
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub layout: DeviceLayout,
}

impl DeviceSlot {
    /// An unassigned single-unit slot, as created by "add screen group".
    pub fn unassigned() -> Self {
        Self::default()
    }

    pub fn is_assigned(&self) -> bool {
        !self.serial.is_empty()
    }
}

/// A screen group: several physical screens treated as one canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub devices: Vec<DeviceSlot>,
}

impl Assignment {
    /// A group of `screens` unassigned single-unit devices.
    pub fn with_screens(screens: u32) -> Self {
        Self {
            devices: (0..screens).map(|_| DeviceSlot::unassigned()).collect(),
        }
    }

    /// Total geometry units of this group.
    pub fn units(&self) -> u32 {
        self.devices.iter().map(|d| d.layout.units()).sum()
    }
}

/// One content slot of a playlist item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSlot {
    /// Geometry units this slot spans.
    pub spread: u32,
    /// Asset shown in the slot; `None` is a blank slot.
    #[serde(default, with = "blank_file")]
    pub file: Option<AssetId>,
}

impl ContentSlot {
    pub fn blank(spread: u32) -> Self {
        Self { spread, file: None }
    }
}

/// One timed step of the playback loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub content: Vec<ContentSlot>,
    /// Play time in seconds.
    pub duration: f64,
}

impl PlaylistItem {
    /// A new item with one blank slot per spread and the default duration.
    pub fn from_layout(layout: &[u32]) -> Self {
        Self {
            content: layout.iter().map(|&spread| ContentSlot::blank(spread)).collect(),
            duration: DEFAULT_DURATION,
        }
    }

    /// Sum of the slot spreads.
    pub fn units(&self) -> u32 {
        self.content.iter().map(|slot| slot.spread).sum()
    }

    /// `false` when the group size changed after this item was created.
    ///
    /// Items are never repaired automatically; renderers use this to mark
    /// stale items.
    pub fn fits(&self, size: u32) -> bool {
        self.units() == size
    }

    /// Layout this item was created with.
    pub fn layout(&self) -> Vec<u32> {
        self.content.iter().map(|slot| slot.spread).collect()
    }
}

/// An action offered for creating a screen group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentOption {
    pub screens: u32,
    pub text: &'static str,
}

/// The persisted configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub playlist: Vec<PlaylistItem>,
    #[serde(default)]
    pub rotation: Rotation,
    /// Whether videos play with sound.
    #[serde(default)]
    pub audio: bool,
    /// Seconds the player may wait before applying a config change.
    #[serde(default)]
    pub synced_changes: u32,
}

impl Config {
    /// Total geometry units of the canvas.
    ///
    /// Defined by the **first** screen group only; 0 without groups.
    pub fn size(&self) -> u32 {
        self.assignments.first().map_or(0, Assignment::units)
    }

    pub fn has_assignments(&self) -> bool {
        !self.assignments.is_empty()
    }

    /// Aspect ratio (width / height) of one screen: 16:9, or 9:16 when rotated
    /// by 90° or 270°.
    pub fn screen_ratio(&self) -> f64 {
        if self.rotation.is_portrait() {
            1.0 / LANDSCAPE_RATIO
        } else {
            LANDSCAPE_RATIO
        }
    }

    /// Layouts offered for new playlist items at the current size.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::TooManyUnits`] when the first group is larger
    /// than the layout table supports (e.g. four `double` devices).
    pub fn layouts(&self) -> Result<Vec<Vec<u32>>, GeometryError> {
        Ok(geometry::layouts(self.size())?
            .iter()
            .map(|layout| layout.to_vec())
            .collect())
    }

    /// Screen-group actions to offer.
    ///
    /// Once a group exists, every further group must share its geometry, so
    /// the only option is another group of `size()` screens.
    pub fn possible_assignments(&self) -> Vec<AssignmentOption> {
        if self.has_assignments() {
            return vec![AssignmentOption {
                screens: self.size(),
                text: "Add new screen group",
            }];
        }
        STARTER_GROUPS.to_vec()
    }

    /// Pixel height of a playlist row at the current size and rotation.
    pub fn row_height(&self) -> Option<f64> {
        geometry::row_height(self.size(), self.screen_ratio())
    }

    /// Informational banner for the playlist editor, if any.
    pub fn editor_hint(&self) -> Option<&'static str> {
        if !self.has_assignments() {
            Some("Configure a device assignment using the option below to configure a playlist.")
        } else if self.playlist.is_empty() {
            Some("Empty playlist. Add items now to get started.")
        } else {
            None
        }
    }

    /// Whether the device assignment section should start expanded.
    pub fn show_advanced_by_default(&self) -> bool {
        !self.has_assignments()
    }
}

/// Serde adapter mapping `Option<AssetId>` to the `"empty.png"` wire sentinel.
mod blank_file {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{AssetId, BLANK_FILE};

    pub fn serialize<S>(file: &Option<AssetId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(file.as_deref().unwrap_or(BLANK_FILE))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<AssetId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawFile {
            Text(String),
            Number(u64),
        }

        Ok(match Option::<RawFile>::deserialize(deserializer)? {
            None => None,
            Some(RawFile::Text(s)) if s.is_empty() || s == BLANK_FILE => None,
            Some(RawFile::Text(s)) => Some(s),
            Some(RawFile::Number(n)) => Some(n.to_string()),
        })
    }
}
