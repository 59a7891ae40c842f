use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use torchlight_geom::{Cell, Vec3};
use torchlight_tracker::{DimensionId, PlayerId, TrackerConfig};

use crate::event::{Event, EventQueue};

// Top-level scenario file
#[derive(Deserialize, Debug, Default)]
pub struct Scenario {
    // Dimension 0
    #[serde(default)]
    pub world: WorldDef,
    #[serde(default)]
    pub dimensions: Vec<DimensionDef>,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub players: Vec<PlayerDef>,
    #[serde(default)]
    pub events: Vec<EventDef>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldDef {
    pub chunk: [i32; 3],
    pub min_y: i32,
    pub max_y: i32,
    // Block for cells never written; must exist in the registry
    pub background: String,
    pub fills: Vec<FillDef>,
}

impl Default for WorldDef {
    fn default() -> Self {
        Self {
            chunk: [16, 16, 16],
            min_y: -64,
            max_y: 319,
            background: "air".into(),
            fills: Vec::new(),
        }
    }
}

/// An extra dimension: `[[dimensions]]` with an `id` and the same keys as `[world]`.
#[derive(Deserialize, Debug, Clone)]
pub struct DimensionDef {
    pub id: u32,
    #[serde(flatten)]
    pub world: WorldDef,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FillDef {
    pub from: [i32; 3],
    pub to: [i32; 3],
    pub block: String,
}

impl FillDef {
    pub fn from_cell(&self) -> Cell {
        Cell::new(self.from[0], self.from[1], self.from[2])
    }

    pub fn to_cell(&self) -> Cell {
        Cell::new(self.to[0], self.to[1], self.to[2])
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PlayerDef {
    pub id: u64,
    #[serde(default)]
    pub dimension: u32,
    pub spawn: [f32; 3],
    #[serde(default)]
    pub item: Option<String>,
    // Tick the player shows up on
    #[serde(default)]
    pub join: u64,
}

// One scripted change; any combination of fields may be set.
#[derive(Deserialize, Debug, Clone)]
pub struct EventDef {
    pub tick: u64,
    pub player: u64,
    #[serde(default)]
    pub move_to: Option<[f32; 3]>,
    // Travel to another dimension; needs `move_to`
    #[serde(default)]
    pub dimension: Option<u32>,
    // Empty string means an empty hand
    #[serde(default)]
    pub hold: Option<String>,
    #[serde(default)]
    pub leave: bool,
}

fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

impl Scenario {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let scenario: Scenario = toml::from_str(toml_str)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Every dimension to build, `[world]` first.
    pub fn worlds(&self) -> Vec<(DimensionId, &WorldDef)> {
        let mut out = vec![(DimensionId::OVERWORLD, &self.world)];
        out.extend(self.dimensions.iter().map(|d| (DimensionId(d.id), &d.world)));
        out
    }

    // Players and events may only refer to dimensions the scenario builds.
    fn validate(&self) -> Result<(), String> {
        let mut ids = vec![DimensionId::OVERWORLD.0];
        for d in &self.dimensions {
            if ids.contains(&d.id) {
                return Err(format!("dimension {} is defined more than once", d.id));
            }
            ids.push(d.id);
        }
        for p in &self.players {
            if !ids.contains(&p.dimension) {
                return Err(format!(
                    "player {} starts in undefined dimension {}",
                    p.id, p.dimension
                ));
            }
        }
        for e in &self.events {
            match (e.dimension, e.move_to) {
                (Some(d), _) if !ids.contains(&d) => {
                    return Err(format!(
                        "event at tick {} sends player {} to undefined dimension {}",
                        e.tick, e.player, d
                    ));
                }
                (Some(_), None) => {
                    return Err(format!(
                        "event at tick {} changes dimension without `move_to`",
                        e.tick
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Queues joins and scripted events. Returns the number of events queued.
    pub fn schedule(&self, queue: &mut EventQueue) -> usize {
        let mut n = 0;
        for p in &self.players {
            queue.emit_at(
                p.join,
                Event::PlayerJoined {
                    player: PlayerId(p.id),
                    dimension: DimensionId(p.dimension),
                    spawn: vec3(p.spawn),
                    item: p.item.clone().filter(|s| !s.is_empty()),
                },
            );
            n += 1;
        }
        for e in &self.events {
            let player = PlayerId(e.player);
            match (e.move_to, e.dimension) {
                (Some(to), Some(dimension)) => {
                    let dimension = DimensionId(dimension);
                    let to = vec3(to);
                    queue.emit_at(e.tick, Event::PlayerTravelled { player, dimension, to });
                    n += 1;
                }
                (Some(to), None) => {
                    queue.emit_at(e.tick, Event::PlayerMoved { player, to: vec3(to) });
                    n += 1;
                }
                _ => {}
            }
            if let Some(item) = &e.hold {
                let item = Some(item.clone()).filter(|s| !s.is_empty());
                queue.emit_at(e.tick, Event::HeldItemChanged { player, item });
                n += 1;
            }
            if e.leave {
                queue.emit_at(e.tick, Event::PlayerLeft { player });
                n += 1;
            }
        }
        n
    }
}
