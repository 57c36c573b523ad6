//! signage-editor library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! ```text
//! CLI / UI intent
//!   └─ application::session   guard → store.dispatch → observers
//!        ├─ application::guard    rejects bad indices, durations, layouts
//!        ├─ application::store    owns EditorState, notifies observers
//!        └─ application::host     HostApi port (ready, assets, config, chooser)
//! infrastructure
//!   ├─ sync_bridge   observer → latest-value channel → HostApi::set_config
//!   ├─ host          FileHost (JSON directory), MemoryHost (embedding/tests)
//!   ├─ storage       settings.toml
//!   └─ runtime       wires session + bridge + asset pump
//! ```

pub mod application;
pub mod infrastructure;
