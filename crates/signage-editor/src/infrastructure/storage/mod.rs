//! Storage infrastructure: the editor's own settings file.
//!
//! The signage config itself is owned by the host and written through
//! `HostApi::set_config`; only the editor's local preferences (log level,
//! default host directory, sync retry policy) are stored here.

pub mod settings;
