//! Domain entities for the signage editor.
//!
//! Everything here is pure business logic: no file system, no host calls, no
//! async.  Outer layers (the editor session, the sync bridge, the CLI) depend
//! on this module, never the other way around, so every rule below can be
//! unit-tested in isolation.

/// The curated layout table and geometry formulas.
pub mod geometry;

/// Read-only mirrors of the host's asset catalog and device list.
pub mod catalog;

/// The persisted configuration and its derived getters.
///
/// See [`config::Config`] for the main type.
pub mod config;

/// The whole session state (config + catalog + devices).
pub mod state;

/// The closed command set and its application.
pub mod command;
