use std::collections::{BTreeMap, HashMap};
use std::error::Error;

use torchlight_blocks::{Block, BlockRegistry};
use torchlight_edit::{BlockSpec, CommandError, EditStore, FillCommand};
use torchlight_geom::{Cell, Vec3};
use torchlight_tracker::{DimensionId, PlayerId, PlayerSnapshot, TagMap, WorldPort};

use crate::scenario::WorldDef;

#[derive(Clone, Debug)]
pub struct PlayerState {
    pub dimension: DimensionId,
    pub position: Vec3,
    pub main_hand: Option<String>,
}

/// Headless host world: a registry, one edit store per dimension, and the online players.
pub struct SimWorld {
    pub reg: BlockRegistry,
    pub dimensions: HashMap<DimensionId, EditStore>,
    pub players: BTreeMap<PlayerId, PlayerState>,
    // Commands issued this run, successful or not
    pub commands_run: u64,
    pub commands_failed: u64,
}

impl SimWorld {
    pub fn new(reg: BlockRegistry) -> Self {
        Self {
            reg,
            dimensions: HashMap::new(),
            players: BTreeMap::new(),
            commands_run: 0,
            commands_failed: 0,
        }
    }

    /// Creates `dimension` from `def`, applying its terrain fills in order.
    pub fn build_dimension(
        &mut self,
        dimension: DimensionId,
        def: &WorldDef,
    ) -> Result<(), Box<dyn Error>> {
        let background = self
            .reg
            .make_block_by_name(&def.background, &[])
            .ok_or_else(|| CommandError::UnknownBlock(def.background.clone()))??;
        let [sx, sy, sz] = def.chunk;
        if sx <= 0 || sy <= 0 || sz <= 0 {
            let msg = format!("{:?}: chunk size {:?} must be positive", dimension, def.chunk);
            return Err(msg.into());
        }
        if def.min_y > def.max_y {
            return Err(format!(
                "{:?}: min_y {} is above max_y {}",
                dimension, def.min_y, def.max_y
            )
            .into());
        }
        let mut store = EditStore::new((sx, sy, sz), def.min_y, def.max_y, background);
        for fill in &def.fills {
            let cmd = FillCommand {
                from: fill.from_cell(),
                to: fill.to_cell(),
                block: BlockSpec::named(&fill.block),
                replace: None,
            };
            match store.apply_fill(&self.reg, &cmd) {
                // A fill that matches what is already there is harmless
                Ok(_) | Err(CommandError::NoBlocksFilled { .. }) => {}
                Err(e) => return Err(format!("world fill `{}`: {}", cmd, e).into()),
            }
        }
        log::info!(
            "built dimension {:?}: {} fill(s), {} edited cell(s)",
            dimension,
            def.fills.len(),
            store.stats().block_edits
        );
        self.dimensions.insert(dimension, store);
        Ok(())
    }

    pub fn block_at(&self, dimension: DimensionId, cell: Cell) -> Option<Block> {
        self.dimensions.get(&dimension)?.get(cell)
    }

    /// Light blocks present in `dimension` with their emitted level.
    pub fn light_blocks(&self, dimension: DimensionId, light_block: &str) -> Vec<(Cell, u8)> {
        let (Some(store), Some(id)) = (
            self.dimensions.get(&dimension),
            self.reg.id_by_name(light_block),
        ) else {
            return Vec::new();
        };
        store
            .cells_with(id)
            .into_iter()
            .filter_map(|c| {
                let b = store.get(c)?;
                let level = self.reg.get(b.id)?.light_emission(b.state);
                Some((c, level))
            })
            .collect()
    }
}

impl WorldPort for SimWorld {
    fn players(&self) -> Vec<PlayerSnapshot> {
        self.players
            .iter()
            .map(|(id, p)| PlayerSnapshot {
                id: *id,
                dimension: p.dimension,
                position: p.position,
                main_hand: p.main_hand.clone(),
            })
            .collect()
    }

    fn block_name(&self, dimension: DimensionId, cell: Cell) -> Option<String> {
        let b = self.block_at(dimension, cell)?;
        self.reg.name_of(b).map(str::to_string)
    }

    fn run_command(
        &mut self,
        player: PlayerId,
        dimension: DimensionId,
        command: &str,
    ) -> Result<(), CommandError> {
        self.commands_run += 1;
        let result = self.apply_command(player, dimension, command);
        if result.is_err() {
            self.commands_failed += 1;
        }
        result
    }
}

impl SimWorld {
    fn apply_command(
        &mut self,
        player: PlayerId,
        dimension: DimensionId,
        command: &str,
    ) -> Result<(), CommandError> {
        if !self.players.contains_key(&player) {
            return Err(CommandError::Rejected(format!("{} is not online", player)));
        }
        let cmd: FillCommand = command.parse()?;
        let store = self
            .dimensions
            .get_mut(&dimension)
            .ok_or_else(|| CommandError::Rejected(format!("{:?} is not loaded", dimension)))?;
        store.apply_fill(&self.reg, &cmd).map(|_| ())
    }
}

pub struct GameState {
    pub tick: u64,
    pub world: SimWorld,
    // Per-entity properties; survive a player leaving
    pub tags: TagMap,
}

impl GameState {
    pub fn new(world: SimWorld) -> Self {
        Self {
            tick: 0,
            world,
            tags: TagMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_world() -> SimWorld {
        let reg = BlockRegistry::from_toml_str(
            r#"
            [[blocks]]
            name = "air"
            id = 0

            [[blocks]]
            name = "stone"
            id = 1

            [[blocks]]
            name = "light_block"
            id = 2
            level_property = "block_light_level"
            levels = 16
            "#,
        )
        .unwrap();
        let mut w = SimWorld::new(reg);
        let def = WorldDef {
            fills: vec![crate::scenario::FillDef {
                from: [0, 0, 0],
                to: [3, 0, 3],
                block: "stone".into(),
            }],
            ..WorldDef::default()
        };
        w.build_dimension(DimensionId::OVERWORLD, &def).unwrap();
        w.players.insert(
            PlayerId(1),
            PlayerState {
                dimension: DimensionId::OVERWORLD,
                position: Vec3::new(0.5, 1.0, 0.5),
                main_hand: None,
            },
        );
        w
    }

    #[test]
    fn block_names_resolve_through_the_registry() {
        let w = make_world();
        let name = |c| w.block_name(DimensionId::OVERWORLD, c);
        assert_eq!(name(Cell::new(2, 0, 2)).as_deref(), Some("stone"));
        assert_eq!(name(Cell::new(2, 1, 2)).as_deref(), Some("air"));
        assert_eq!(name(Cell::new(0, 500, 0)), None);
        assert_eq!(w.block_name(DimensionId(1), Cell::new(0, 1, 0)), None);
    }

    #[test]
    fn commands_apply_in_the_given_dimension() {
        let mut w = make_world();
        let overworld = DimensionId::OVERWORLD;
        w.run_command(
            PlayerId(1),
            overworld,
            "fill 1 1 1 1 1 1 light_block [\"block_light_level\" = 9] replace air",
        )
        .unwrap();
        assert_eq!(
            w.light_blocks(DimensionId::OVERWORLD, "light_block"),
            vec![(Cell::new(1, 1, 1), 9)]
        );

        let err = w
            .run_command(PlayerId(1), overworld, "fill 1 0 1 1 0 1 light_block replace air")
            .unwrap_err();
        assert!(matches!(err, CommandError::NoBlocksFilled { .. }));
        let err = w
            .run_command(PlayerId(7), overworld, "fill 1 1 1 1 1 1 air replace light_block")
            .unwrap_err();
        assert!(matches!(err, CommandError::Rejected(_)));
        let err = w
            .run_command(PlayerId(1), DimensionId(3), "fill 1 1 1 1 1 1 air replace light_block")
            .unwrap_err();
        assert!(matches!(err, CommandError::Rejected(_)));
        assert_eq!((w.commands_run, w.commands_failed), (4, 3));

        // The player's own dimension doesn't matter, only the one named.
        w.build_dimension(DimensionId(1), &WorldDef::default()).unwrap();
        w.run_command(
            PlayerId(1),
            DimensionId(1),
            "fill 1 1 1 1 1 1 light_block [\"block_light_level\" = 4] replace air",
        )
        .unwrap();
        assert_eq!(
            w.light_blocks(DimensionId(1), "light_block"),
            vec![(Cell::new(1, 1, 1), 4)]
        );
        assert_eq!(w.light_blocks(overworld, "light_block").len(), 1);
    }

    #[test]
    fn unknown_terrain_block_fails_the_build() {
        let mut w = make_world();
        let def = WorldDef {
            fills: vec![crate::scenario::FillDef {
                from: [0, 0, 0],
                to: [0, 0, 0],
                block: "obsidian".into(),
            }],
            ..WorldDef::default()
        };
        assert!(w.build_dimension(DimensionId(1), &def).is_err());
    }

    #[test]
    fn degenerate_dimensions_are_refused() {
        let mut w = make_world();
        let flat = WorldDef {
            chunk: [16, 0, 16],
            ..WorldDef::default()
        };
        let err = w.build_dimension(DimensionId(1), &flat).unwrap_err();
        assert!(err.to_string().contains("must be positive"), "{}", err);
        let upside_down = WorldDef {
            min_y: 10,
            max_y: 0,
            ..WorldDef::default()
        };
        assert!(w.build_dimension(DimensionId(1), &upside_down).is_err());
        assert!(!w.dimensions.contains_key(&DimensionId(1)));
    }
}
