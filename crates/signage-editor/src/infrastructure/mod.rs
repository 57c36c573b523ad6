//! Infrastructure layer for the editor.
//!
//! Contains the adapters that touch the outside world: the host
//! implementations, the sync bridge that persists configs, the settings file
//! and the runtime that wires them to the session.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `signage_core`, but MUST NOT be imported by the `application` layer.

pub mod host;
pub mod runtime;
pub mod storage;
pub mod sync_bridge;
