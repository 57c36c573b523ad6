//! Boundary validation for editor commands.
//!
//! The command processor in `signage-core` does not check its payload: an
//! unchecked index or a half-second duration would silently produce a config
//! the player cannot use.  [`check`] runs against the current state before
//! every dispatch and rejects such commands with a [`CommandError`], leaving
//! the state untouched.
//!
//! What is deliberately *not* checked: whether every screen group has the
//! same size, and whether existing playlist items still fit the canvas after
//! a group changes.  Both are open design questions, not guard rules.

use signage_core::domain::geometry::MAX_UNITS;
use signage_core::{Command, EditorState, PlaylistItem, MIN_DURATION};
use thiserror::Error;

/// Why a command was rejected at the boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CommandError {
    #[error("playlist item {index} does not exist (playlist has {len} items)")]
    ItemOutOfRange { index: usize, len: usize },

    #[error("slot {index} does not exist in playlist item {item} ({len} slots)")]
    SlotOutOfRange { item: usize, index: usize, len: usize },

    #[error("screen group {index} does not exist ({len} groups)")]
    AssignmentOutOfRange { index: usize, len: usize },

    #[error("device {index} does not exist in screen group {assignment} ({len} devices)")]
    DeviceOutOfRange {
        assignment: usize,
        index: usize,
        len: usize,
    },

    #[error("play time must be a number of at least {min} seconds (got {0})", min = MIN_DURATION)]
    DurationTooShort(f64),

    #[error("playlist items need a screen group; add one first")]
    NoAssignments,

    #[error("layout spreads must be positive")]
    ZeroSpread,

    #[error("layout covers {actual} units but the screen group has {expected}")]
    LayoutMismatch { expected: u32, actual: u32 },

    #[error("a screen group needs between 1 and {max} screens (got {0})", max = MAX_UNITS)]
    ScreenCountOutOfRange(u32),

    #[error("asset {0:?} is not in the asset catalog")]
    UnknownAsset(String),

    #[error("device {0:?} is not known to the host")]
    UnknownDevice(String),
}

/// Validates `command` against `state`.
///
/// # Errors
///
/// Returns the first [`CommandError`] that applies; `Ok(())` means the command
/// can be applied without corrupting the config.
pub fn check(state: &EditorState, command: &Command) -> Result<(), CommandError> {
    let config = &state.config;

    match command {
        Command::Init { .. } | Command::AssetsUpdate(_) | Command::SetConfig(_) => Ok(()),

        Command::AddItem { layout } => {
            if !config.has_assignments() {
                return Err(CommandError::NoAssignments);
            }
            check_spreads(layout.iter().copied(), config.size())
        }

        Command::DeleteItem { item_idx } => check_item(state, *item_idx).map(|_| ()),

        Command::AssignAsset {
            item_idx,
            slot_idx,
            asset_id,
        } => {
            check_slot(state, *item_idx, *slot_idx)?;
            if !state.assets.contains_key(asset_id) {
                return Err(CommandError::UnknownAsset(asset_id.clone()));
            }
            Ok(())
        }

        Command::UpdateDuration { item_idx, duration } => {
            check_item(state, *item_idx)?;
            check_duration(*duration)
        }

        // Reorders may carry stale items, so layouts are not matched
        // against the current size here.
        Command::UpdatePlaylist(playlist) => playlist.iter().try_for_each(|item| {
            check_duration(item.duration)?;
            if item.content.iter().any(|slot| slot.spread == 0) {
                return Err(CommandError::ZeroSpread);
            }
            Ok(())
        }),

        Command::AddAssignment { screens } => {
            if *screens == 0 || *screens > MAX_UNITS {
                return Err(CommandError::ScreenCountOutOfRange(*screens));
            }
            Ok(())
        }

        Command::DeleteAssignment { assignment_idx } => {
            check_assignment(state, *assignment_idx)
        }

        Command::UpdateSerial {
            assignment_idx,
            device_idx,
            serial,
        } => {
            check_assignment(state, *assignment_idx)?;
            let len = config.assignments[*assignment_idx].devices.len();
            if *device_idx >= len {
                return Err(CommandError::DeviceOutOfRange {
                    assignment: *assignment_idx,
                    index: *device_idx,
                    len,
                });
            }
            if !state.knows_serial(serial) {
                return Err(CommandError::UnknownDevice(serial.clone()));
            }
            Ok(())
        }
    }
}

/// Resolves playlist item `index`.
///
/// # Errors
///
/// Returns [`CommandError::ItemOutOfRange`] when there is no such item.
pub fn check_item(state: &EditorState, index: usize) -> Result<&PlaylistItem, CommandError> {
    let playlist = &state.config.playlist;
    playlist.get(index).ok_or(CommandError::ItemOutOfRange {
        index,
        len: playlist.len(),
    })
}

/// Checks that slot `slot` of item `item` exists.
///
/// # Errors
///
/// Returns [`CommandError::ItemOutOfRange`] or [`CommandError::SlotOutOfRange`].
pub fn check_slot(state: &EditorState, item: usize, slot: usize) -> Result<(), CommandError> {
    let len = check_item(state, item)?.content.len();
    if slot >= len {
        return Err(CommandError::SlotOutOfRange {
            item,
            index: slot,
            len,
        });
    }
    Ok(())
}

fn check_assignment(state: &EditorState, index: usize) -> Result<(), CommandError> {
    let len = state.config.assignments.len();
    if index >= len {
        return Err(CommandError::AssignmentOutOfRange { index, len });
    }
    Ok(())
}

fn check_duration(duration: f64) -> Result<(), CommandError> {
    // `!(a >= b)` also rejects NaN.
    if !(duration >= MIN_DURATION) || duration.is_infinite() {
        return Err(CommandError::DurationTooShort(duration));
    }
    Ok(())
}

fn check_spreads(spreads: impl Iterator<Item = u32>, size: u32) -> Result<(), CommandError> {
    let mut total = 0u32;
    for spread in spreads {
        if spread == 0 {
            return Err(CommandError::ZeroSpread);
        }
        total = total.saturating_add(spread);
    }
    if total != size {
        return Err(CommandError::LayoutMismatch {
            expected: size,
            actual: total,
        });
    }
    Ok(())
}
