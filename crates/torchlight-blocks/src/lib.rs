//! Block types, the light-level block state, and the TOML-driven registry.
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;
pub mod types;

pub use registry::{BlockRegistry, BlockType, LevelProperty, RegistryError};
pub use types::{Block, BlockId, BlockState};
