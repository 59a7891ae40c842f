use torchlight_edit::{BlockSpec, FillCommand};
use torchlight_geom::{Cell, NEIGHBOR_OFFSETS};

use crate::config::{Placement, TrackerConfig};
use crate::port::{DimensionId, PlayerId, PlayerSnapshot, TagStore, WorldPort};

/// Player cell the current light was placed for.
pub const ANCHOR_TAG_KEY: &str = "lastLightAnchor";

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub players: usize,
    pub placed: usize,
    pub cleared: usize,
    pub failures: usize,
}

pub struct LightTracker {
    cfg: TrackerConfig,
}

impl LightTracker {
    pub fn new(cfg: TrackerConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.cfg
    }

    /// One simulation step over every active player.
    pub fn tick<W, T>(&self, world: &mut W, tags: &mut T) -> TickReport
    where
        W: WorldPort + ?Sized,
        T: TagStore + ?Sized,
    {
        let mut report = TickReport::default();
        for player in world.players() {
            report.players += 1;
            match self.cfg.light_level_for(player.main_hand.as_deref()) {
                Some(level) => self.update_light(world, tags, &player, level, &mut report),
                None => self.clear_tracked_light(world, tags, &player, &mut report),
            }
        }
        if report.placed > 0 || report.cleared > 0 || report.failures > 0 {
            log::debug!(
                "light tick: players={} placed={} cleared={} failures={}",
                report.players,
                report.placed,
                report.cleared,
                report.failures
            );
        }
        report
    }

    /// Keeps a light next to `player`, moving it when the player changes cell or dimension.
    pub fn update_light<W, T>(
        &self,
        world: &mut W,
        tags: &mut T,
        player: &PlayerSnapshot,
        level: u8,
        report: &mut TickReport,
    ) where
        W: WorldPort + ?Sized,
        T: TagStore + ?Sized,
    {
        let current = player.position.cell();
        let last = self.read_cell(tags, player.id, &self.cfg.tag_key);
        let anchor = self.read_anchor(tags, player.id);

        if let Some(last) = last {
            // A light without an anchor is always stale.
            if anchor == Some((player.dimension, current)) {
                return;
            }
            let lit_in = anchor.map_or(player.dimension, |(dim, _)| dim);
            self.clear_light_block(world, player.id, lit_in, last, report);
        }

        let target = self.find_suitable_location(&*world, player.dimension, current);
        self.place_light_block(world, player.id, player.dimension, target, level, report);
        tags.set_tag(player.id, &self.cfg.tag_key, Some(target.key()));
        tags.set_tag(
            player.id,
            ANCHOR_TAG_KEY,
            Some(encode_anchor(player.dimension, current)),
        );
    }

    /// First neighbor of `origin` (above, horizontals, below) that can hold a light,
    /// or `origin` itself when none can.
    pub fn find_suitable_location<W>(
        &self,
        world: &W,
        dimension: DimensionId,
        origin: Cell,
    ) -> Cell
    where
        W: WorldPort + ?Sized,
    {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|&o| origin.offset(o))
            .find(|&c| self.is_suitable(world.block_name(dimension, c).as_deref()))
            .unwrap_or(origin)
    }

    pub fn is_suitable(&self, block: Option<&str>) -> bool {
        block.is_some_and(|name| self.cfg.is_replaceable(name))
    }

    /// Writes a light block of `level` at `cell`. Returns whether any fill succeeded.
    pub fn place_light_block<W>(
        &self,
        world: &mut W,
        player: PlayerId,
        dimension: DimensionId,
        cell: Cell,
        level: u8,
        report: &mut TickReport,
    ) -> bool
    where
        W: WorldPort + ?Sized,
    {
        let filters: Vec<String> = match self.cfg.placement {
            Placement::Sequential => self.cfg.replaceable.clone(),
            Placement::Dispatch => match world.block_name(dimension, cell) {
                Some(name) if self.cfg.is_replaceable(&name) => vec![name],
                Some(name) => {
                    log::debug!("{}: no light at {}, cell holds {}", player, cell, name);
                    return false;
                }
                None => self.cfg.replaceable.clone(),
            },
        };
        let light = BlockSpec::named(&self.cfg.light_block)
            .with_prop(&self.cfg.light_level_property, level);

        let mut placed = false;
        for filter in filters {
            let cmd = FillCommand::replace_at(cell, light.clone(), filter);
            placed |= self.run(world, player, dimension, &cmd, report);
        }
        if placed {
            report.placed += 1;
            log::debug!("{}: light {} placed at {}", player, level, cell);
        }
        placed
    }

    /// Turns the light block at `cell` back into air; anything else there is left alone.
    pub fn clear_light_block<W>(
        &self,
        world: &mut W,
        player: PlayerId,
        dimension: DimensionId,
        cell: Cell,
        report: &mut TickReport,
    ) -> bool
    where
        W: WorldPort + ?Sized,
    {
        let cmd = FillCommand::replace_at(
            cell,
            BlockSpec::named(&self.cfg.air_block),
            &self.cfg.light_block,
        );
        let cleared = self.run(world, player, dimension, &cmd, report);
        if cleared {
            report.cleared += 1;
            log::debug!("{}: light cleared at {}", player, cell);
        }
        cleared
    }

    /// Removes the tracked light, if any, and forgets it.
    pub fn clear_tracked_light<W, T>(
        &self,
        world: &mut W,
        tags: &mut T,
        player: &PlayerSnapshot,
        report: &mut TickReport,
    ) where
        W: WorldPort + ?Sized,
        T: TagStore + ?Sized,
    {
        let anchor = self.read_anchor(tags, player.id);
        if let Some(last) = self.read_cell(tags, player.id, &self.cfg.tag_key) {
            let lit_in = anchor.map_or(player.dimension, |(dim, _)| dim);
            self.clear_light_block(world, player.id, lit_in, last, report);
            tags.set_tag(player.id, &self.cfg.tag_key, None);
        }
        if anchor.is_some() {
            tags.set_tag(player.id, ANCHOR_TAG_KEY, None);
        }
    }

    fn run<W>(
        &self,
        world: &mut W,
        player: PlayerId,
        dimension: DimensionId,
        cmd: &FillCommand,
        report: &mut TickReport,
    ) -> bool
    where
        W: WorldPort + ?Sized,
    {
        let text = cmd.to_string();
        match world.run_command(player, dimension, &text) {
            Ok(()) => true,
            Err(e) => {
                report.failures += 1;
                log::warn!("{}: command failed: {}: {}", player, text, e);
                false
            }
        }
    }

    fn read_cell<T>(&self, tags: &mut T, player: PlayerId, key: &str) -> Option<Cell>
    where
        T: TagStore + ?Sized,
    {
        let raw = tags.get_tag(player, key)?;
        match raw.parse::<Cell>() {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("{}: dropping unreadable {} {:?}: {}", player, key, raw, e);
                tags.set_tag(player, key, None);
                None
            }
        }
    }

    fn read_anchor<T>(&self, tags: &mut T, player: PlayerId) -> Option<(DimensionId, Cell)>
    where
        T: TagStore + ?Sized,
    {
        let raw = tags.get_tag(player, ANCHOR_TAG_KEY)?;
        match decode_anchor(&raw) {
            Some(anchor) => Some(anchor),
            None => {
                log::warn!("{}: dropping unreadable {} {:?}", player, ANCHOR_TAG_KEY, raw);
                tags.set_tag(player, ANCHOR_TAG_KEY, None);
                None
            }
        }
    }
}

/// `"<dimension> x y z"`
fn encode_anchor(dimension: DimensionId, cell: Cell) -> String {
    format!("{} {}", dimension.0, cell)
}

fn decode_anchor(raw: &str) -> Option<(DimensionId, Cell)> {
    let (dim, cell) = raw.trim().split_once(' ')?;
    Some((DimensionId(dim.parse().ok()?), cell.parse().ok()?))
}
