//! Application layer use cases for the editor.
//!
//! This layer sits between the domain model in `signage-core` and the
//! infrastructure adapters.  It orchestrates commands, depends only on the
//! [`host::HostApi`] abstraction, and performs no file or terminal I/O itself.
//!
//! # Sub-modules
//!
//! - **`guard`**   – Boundary validation run before every dispatch.  The
//!   command processor trusts its input; this is where bad indices,
//!   too-short durations and mismatched layouts are stopped.
//!
//! - **`store`**   – The explicit state container: applies commands and
//!   notifies observers after each commit.
//!
//! - **`host`**    – The port the host environment implements.
//!
//! - **`session`** – Bootstrap, asset refresh and the asset-picker flow on
//!   top of the store.

pub mod guard;
pub mod host;
pub mod session;
pub mod store;
