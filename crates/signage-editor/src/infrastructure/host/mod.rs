//! Host adapters implementing [`HostApi`](crate::application::host::HostApi).
//!
//! - **`file`**   – A directory of JSON files (`assets.json`, `devices.json`,
//!   `config.json`) with a terminal asset chooser.  Used by the CLI.
//!
//! - **`memory`** – Everything held in memory.  Used when embedding the editor
//!   and in tests; records persisted configs and can inject failures.

pub mod file;
pub mod memory;

pub use file::FileHost;
pub use memory::MemoryHost;
