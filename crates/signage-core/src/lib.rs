//! # signage-core
//!
//! Configuration state model for a digital-signage device: how many physical
//! screens are attached, how they are grouped, and what content plays on each
//! screen over time.
//!
//! This crate has zero dependencies on I/O, async runtimes, or UI frameworks.
//! It is used by the `signage-editor` crate, which adds the host boundary,
//! persistence and the command-line front end.
//!
//! # Architecture overview
//!
//! A signage device drives one or more *screen groups*.  Each group is a row
//! of physical screens treated as one logical canvas.  A screen counts as one
//! geometry unit, or two when it spans two content slots (`double`).  The
//! playlist is a loop of timed *items*; each item splits the canvas into
//! content slots according to a *layout* (e.g. `1:2` = one unit, then two).
//!
//! - **`domain::geometry`** – The curated layout table and the formulas that
//!   turn units into on-screen proportions.
//!
//! - **`domain::config`** – The persisted [`Config`] and its derived getters
//!   (size, aspect ratio, offered actions).
//!
//! - **`domain::catalog`** – Read-only mirrors of the host's assets and
//!   devices.
//!
//! - **`domain::state`** / **`domain::command`** – The session's
//!   [`EditorState`] and the closed [`Command`] set that derives one state from
//!   the previous one.

pub mod domain;

pub use domain::catalog::{Asset, AssetCatalog, AssetId, AssetMetadata, Device, FileType};
pub use domain::command::{Command, ConfigField};
pub use domain::config::{
    Assignment, AssignmentOption, Config, ContentSlot, DeviceLayout, DeviceSlot, PlaylistItem,
    Rotation, DEFAULT_DURATION, MIN_DURATION,
};
pub use domain::geometry::{GeometryError, MAX_UNITS};
pub use domain::state::EditorState;
