//! World-edit commands and the in-memory edit store that applies them.
#![forbid(unsafe_code)]

pub mod command;
pub mod store;

pub use command::{BlockSpec, CommandError, FillCommand};
pub use store::{EditStore, EditStoreStats, MAX_FILL_VOLUME};
