use std::fmt;

use hashbrown::HashMap;
use torchlight_edit::CommandError;
use torchlight_geom::{Cell, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DimensionId(pub u32);

impl DimensionId {
    pub const OVERWORLD: DimensionId = DimensionId(0);
}

/// What the host tells us about one active player this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub dimension: DimensionId,
    pub position: Vec3,
    /// Type identifier of the main-hand item, e.g. `minecraft:torch`.
    pub main_hand: Option<String>,
}

/// Host boundary for world queries and edits.
pub trait WorldPort {
    fn players(&self) -> Vec<PlayerSnapshot>;

    /// Name of the block at `cell`, or `None` when the cell can't be resolved
    /// (unloaded or outside the world).
    fn block_name(&self, dimension: DimensionId, cell: Cell) -> Option<String>;

    /// Runs a textual world-edit command in `dimension` on behalf of `player`.
    fn run_command(
        &mut self,
        player: PlayerId,
        dimension: DimensionId,
        command: &str,
    ) -> Result<(), CommandError>;
}

/// Per-entity string properties persisted by the host.
pub trait TagStore {
    fn get_tag(&self, player: PlayerId, key: &str) -> Option<String>;

    /// `None` removes the property.
    fn set_tag(&mut self, player: PlayerId, key: &str, value: Option<String>);
}

/// In-memory [`TagStore`].
#[derive(Default, Debug, Clone)]
pub struct TagMap {
    inner: HashMap<PlayerId, HashMap<String, String>>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags_for(&self, player: PlayerId) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .inner
            .get(&player)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// Players that currently have at least one property.
    pub fn players(&self) -> Vec<PlayerId> {
        let mut out: Vec<PlayerId> = self.inner.keys().copied().collect();
        out.sort();
        out
    }
}

impl TagStore for TagMap {
    fn get_tag(&self, player: PlayerId, key: &str) -> Option<String> {
        self.inner.get(&player).and_then(|m| m.get(key).cloned())
    }

    fn set_tag(&mut self, player: PlayerId, key: &str, value: Option<String>) {
        match value {
            Some(v) => {
                self.inner
                    .entry(player)
                    .or_default()
                    .insert(key.to_string(), v);
            }
            None => {
                if let Some(m) = self.inner.get_mut(&player) {
                    m.remove(key);
                    if m.is_empty() {
                        self.inner.remove(&player);
                    }
                }
            }
        }
    }
}
