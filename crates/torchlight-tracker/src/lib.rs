//! Per-tick dynamic light for players holding a light-source item.
//!
//! The tracker is host-agnostic: everything it needs from the game comes
//! through [`WorldPort`] (players, block lookups, commands) and
//! [`TagStore`] (per-entity string properties).
#![forbid(unsafe_code)]

pub mod config;
pub mod port;
pub mod tracker;

pub use config::{Placement, TrackerConfig};
pub use port::{DimensionId, PlayerId, PlayerSnapshot, TagMap, TagStore, WorldPort};
pub use tracker::{ANCHOR_TAG_KEY, LightTracker, TickReport};
