use std::collections::HashMap;

use torchlight_blocks::{Block, BlockRegistry};
use torchlight_geom::Cell;

use crate::command::{CommandError, FillCommand};

/// Largest region a single fill may touch.
pub const MAX_FILL_VOLUME: u64 = 32_768;

#[derive(Default, Debug, Clone, Copy)]
pub struct EditStoreStats {
    pub chunk_entries: usize,
    pub block_edits: usize,
    pub rev: u64,
}

/// Chunk-aware sparse block store with a vertical build limit.
///
/// Cells that were never written read back as `background`; cells outside
/// `min_y..=max_y` have no block at all.
pub struct EditStore {
    sx: i32,
    sy: i32,
    sz: i32,
    min_y: i32,
    max_y: i32,
    background: Block,
    // Map per-chunk: key=(cx,cy,cz) -> map of world cells -> Block
    inner: HashMap<(i32, i32, i32), HashMap<Cell, Block>>,
    // Bumped on every successful write
    rev: u64,
}

impl EditStore {
    pub fn new(chunk: (i32, i32, i32), min_y: i32, max_y: i32, background: Block) -> Self {
        Self {
            sx: chunk.0,
            sy: chunk.1,
            sz: chunk.2,
            min_y,
            max_y,
            background,
            inner: HashMap::new(),
            rev: 0,
        }
    }

    pub fn stats(&self) -> EditStoreStats {
        EditStoreStats {
            chunk_entries: self.inner.len(),
            block_edits: self.inner.values().map(|m| m.len()).sum(),
            rev: self.rev,
        }
    }

    #[inline]
    fn chunk_key(&self, c: Cell) -> (i32, i32, i32) {
        (
            c.x.div_euclid(self.sx),
            c.y.div_euclid(self.sy),
            c.z.div_euclid(self.sz),
        )
    }

    #[inline]
    pub fn in_bounds(&self, c: Cell) -> bool {
        c.y >= self.min_y && c.y <= self.max_y
    }

    pub fn get(&self, c: Cell) -> Option<Block> {
        if !self.in_bounds(c) {
            return None;
        }
        let k = self.chunk_key(c);
        Some(
            self.inner
                .get(&k)
                .and_then(|m| m.get(&c).copied())
                .unwrap_or(self.background),
        )
    }

    /// Writes `b` at `c`; returns false (and stores nothing) outside the build limit.
    pub fn set(&mut self, c: Cell, b: Block) -> bool {
        if !self.in_bounds(c) {
            return false;
        }
        let k = self.chunk_key(c);
        let entry = self.inner.entry(k).or_default();
        if b == self.background {
            entry.remove(&c);
            if entry.is_empty() {
                self.inner.remove(&k);
            }
        } else {
            entry.insert(c, b);
        }
        self.rev = self.rev.wrapping_add(1);
        true
    }

    /// Every non-background cell holding a block of type `id`, in cell order.
    pub fn cells_with(&self, id: u16) -> Vec<Cell> {
        let mut out: Vec<Cell> = self
            .inner
            .values()
            .flat_map(|m| m.iter().filter(|(_, b)| b.id == id).map(|(c, _)| *c))
            .collect();
        out.sort();
        out
    }

    /// Applies a fill, honoring the optional replace filter. Returns the number of cells written.
    ///
    /// A fill that changes nothing is reported as `NoBlocksFilled`.
    pub fn apply_fill(
        &mut self,
        reg: &BlockRegistry,
        cmd: &FillCommand,
    ) -> Result<usize, CommandError> {
        let volume = cmd.volume();
        if volume > MAX_FILL_VOLUME {
            return Err(CommandError::Rejected(format!(
                "too many blocks in the specified area ({} > {})",
                volume, MAX_FILL_VOLUME
            )));
        }
        let (min, max) = cmd.bounds();
        if !self.in_bounds(min) || !self.in_bounds(max) {
            return Err(CommandError::Rejected("cannot place blocks outside of the world".into()));
        }
        let block = reg
            .make_block_by_name(&cmd.block.name, &cmd.block.props)
            .ok_or_else(|| CommandError::UnknownBlock(cmd.block.name.clone()))??;
        let filter = match cmd.replace.as_deref() {
            Some(name) => Some(
                reg.id_by_name(name)
                    .ok_or_else(|| CommandError::UnknownBlock(name.to_string()))?,
            ),
            None => None,
        };

        let mut written = 0usize;
        for y in min.y..=max.y {
            for z in min.z..=max.z {
                for x in min.x..=max.x {
                    let c = Cell::new(x, y, z);
                    let Some(cur) = self.get(c) else { continue };
                    if filter.is_some_and(|id| cur.id != id) || cur == block {
                        continue;
                    }
                    if self.set(c, block) {
                        written += 1;
                    }
                }
            }
        }
        if written == 0 {
            return Err(CommandError::NoBlocksFilled {
                from: cmd.from,
                to: cmd.to,
            });
        }
        log::trace!("{} -> {} block(s)", cmd, written);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::BlockSpec;

    fn make_registry() -> BlockRegistry {
        BlockRegistry::from_toml_str(
            r#"
            [[blocks]]
            name = "air"
            id = 0

            [[blocks]]
            name = "stone"
            id = 1

            [[blocks]]
            name = "water"
            id = 2

            [[blocks]]
            name = "light_block"
            id = 3
            level_property = "block_light_level"
            levels = 16
            "#,
        )
        .unwrap()
    }

    fn make_store() -> EditStore {
        EditStore::new((16, 16, 16), -64, 319, Block::AIR)
    }

    fn light(level: u8) -> BlockSpec {
        BlockSpec::named("light_block").with_prop("block_light_level", level)
    }

    #[test]
    fn replace_filter_only_touches_matching_cells() {
        let reg = make_registry();
        let mut store = make_store();
        let c = Cell::new(0, 64, 0);
        let stone = Block { id: 1, state: 0 };
        assert!(store.set(c, stone));

        let err = store
            .apply_fill(&reg, &FillCommand::replace_at(c, light(10), "air"))
            .unwrap_err();
        assert_eq!(err, CommandError::NoBlocksFilled { from: c, to: c });
        assert_eq!(store.get(c), Some(stone));

        let n = store
            .apply_fill(&reg, &FillCommand::replace_at(c, light(10), "stone"))
            .unwrap();
        assert_eq!(n, 1);
        let placed = store.get(c).unwrap();
        assert_eq!(reg.get(placed.id).unwrap().light_emission(placed.state), 10);
    }

    #[test]
    fn place_then_clear_leaves_air() {
        let reg = make_registry();
        let mut store = make_store();
        let c = Cell::new(-5, 80, 9);
        store
            .apply_fill(&reg, &FillCommand::replace_at(c, light(7), "air"))
            .unwrap();
        assert_eq!(store.cells_with(3), vec![c]);
        store
            .apply_fill(
                &reg,
                &FillCommand::replace_at(c, BlockSpec::named("air"), "light_block"),
            )
            .unwrap();
        assert_eq!(store.get(c), Some(Block::AIR));
        assert_eq!(store.stats().block_edits, 0);
        assert_eq!(store.stats().chunk_entries, 0);
    }

    #[test]
    fn rejects_unknown_blocks_and_out_of_world_fills() {
        let reg = make_registry();
        let mut store = make_store();
        let c = Cell::new(0, 64, 0);
        assert_eq!(
            store.apply_fill(&reg, &FillCommand::replace_at(c, BlockSpec::named("glowstone"), "air")),
            Err(CommandError::UnknownBlock("glowstone".into()))
        );
        assert_eq!(
            store.apply_fill(&reg, &FillCommand::replace_at(c, light(3), "lava")),
            Err(CommandError::UnknownBlock("lava".into()))
        );
        let high = Cell::new(0, 400, 0);
        assert!(matches!(
            store.apply_fill(&reg, &FillCommand::replace_at(high, light(3), "air")),
            Err(CommandError::Rejected(_))
        ));
        assert_eq!(store.get(high), None);
    }

    #[test]
    fn oversized_fill_is_rejected() {
        let reg = make_registry();
        let mut store = make_store();
        let cmd = FillCommand {
            from: Cell::new(0, 0, 0),
            to: Cell::new(63, 63, 63),
            block: BlockSpec::named("stone"),
            replace: None,
        };
        assert!(matches!(store.apply_fill(&reg, &cmd), Err(CommandError::Rejected(_))));
        assert_eq!(store.stats().rev, 0);
    }

    #[test]
    fn edits_are_grouped_by_chunk() {
        let mut store = make_store();
        let stone = Block { id: 1, state: 0 };
        store.set(Cell::new(1, 1, 1), stone);
        store.set(Cell::new(2, 1, 1), stone);
        store.set(Cell::new(17, 1, 1), stone);
        store.set(Cell::new(-1, 1, 1), stone);
        assert_eq!(store.stats().chunk_entries, 3);
        assert_eq!(store.stats().block_edits, 4);
        assert_eq!(store.cells_with(1)[0], Cell::new(-1, 1, 1));
    }
}
