use torchlight_tracker::{LightTracker, PlayerId, TagStore, TickReport};

use crate::event::{Event, EventQueue};
use crate::gamestate::{GameState, PlayerState};

/// Running totals over a whole session.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTotals {
    pub ticks: u64,
    pub placed: usize,
    pub cleared: usize,
    pub failures: usize,
}

pub struct App {
    pub gs: GameState,
    pub queue: EventQueue,
    pub tracker: LightTracker,
    pub totals: RunTotals,
}

impl App {
    pub fn new(gs: GameState, queue: EventQueue, tracker: LightTracker) -> Self {
        Self {
            gs,
            queue,
            tracker,
            totals: RunTotals::default(),
        }
    }

    /// Drains this tick's events, then runs the light tracker once.
    pub fn step(&mut self) -> TickReport {
        self.queue.emit_now(Event::Tick);
        while let Some(env) = self.queue.pop_ready() {
            Self::log_event(env.tick, env.id, &env.kind);
            self.handle_event(env.kind);
        }
        let report = self.tracker.tick(&mut self.gs.world, &mut self.gs.tags);
        self.totals.ticks += 1;
        self.totals.placed += report.placed;
        self.totals.cleared += report.cleared;
        self.totals.failures += report.failures;
        self.queue.advance_tick();
        self.gs.tick = self.queue.now;
        report
    }

    pub fn run(&mut self, ticks: u64) -> RunTotals {
        for _ in 0..ticks {
            self.step();
        }
        self.totals
    }

    fn handle_event(&mut self, ev: Event) {
        let players = &mut self.gs.world.players;
        match ev {
            Event::Tick => {}
            Event::PlayerJoined {
                player,
                dimension,
                spawn,
                item,
            } => {
                players.insert(
                    player,
                    PlayerState {
                        dimension,
                        position: spawn,
                        main_hand: item,
                    },
                );
            }
            Event::PlayerLeft { player } => {
                players.remove(&player);
            }
            Event::PlayerTravelled {
                player,
                dimension,
                to,
            } => match players.get_mut(&player) {
                Some(p) => {
                    p.dimension = dimension;
                    p.position = to;
                }
                None => log::warn!("travel for offline {}", player),
            },
            Event::PlayerMoved { player, to } => match players.get_mut(&player) {
                Some(p) => p.position = to,
                None => log::warn!("move for offline {}", player),
            },
            Event::HeldItemChanged { player, item } => match players.get_mut(&player) {
                Some(p) => p.main_hand = item,
                None => log::warn!("item change for offline {}", player),
            },
        }
    }

    pub(crate) fn log_event(tick: u64, id: u64, ev: &Event) {
        match ev {
            Event::Tick => {
                log::trace!(target: "events", "[tick {}] Tick #{}", tick, id);
            }
            Event::PlayerJoined {
                player,
                dimension,
                spawn,
                item,
            } => {
                log::info!(
                    target: "events",
                    "[tick {}] PlayerJoined {} dim={:?} at ({:.2}, {:.2}, {:.2}) holding {}",
                    tick,
                    player,
                    dimension,
                    spawn.x,
                    spawn.y,
                    spawn.z,
                    item.as_deref().unwrap_or("nothing")
                );
            }
            Event::PlayerLeft { player } => {
                log::info!(target: "events", "[tick {}] PlayerLeft {}", tick, player);
            }
            Event::PlayerTravelled {
                player,
                dimension,
                to,
            } => {
                log::info!(
                    target: "events",
                    "[tick {}] PlayerTravelled {} to {:?} at ({:.2}, {:.2}, {:.2})",
                    tick,
                    player,
                    dimension,
                    to.x,
                    to.y,
                    to.z
                );
            }
            Event::PlayerMoved { player, to } => {
                log::info!(
                    target: "events",
                    "[tick {}] PlayerMoved {} to ({:.2}, {:.2}, {:.2}) cell {}",
                    tick,
                    player,
                    to.x,
                    to.y,
                    to.z,
                    to.cell()
                );
            }
            Event::HeldItemChanged { player, item } => {
                log::info!(
                    target: "events",
                    "[tick {}] HeldItemChanged {} -> {}",
                    tick,
                    player,
                    item.as_deref().unwrap_or("nothing")
                );
            }
        }
    }

    /// Human-readable end-of-run state: lights per dimension and each known player's tags.
    pub fn summary(&self) -> String {
        let cfg = self.tracker.config();
        let mut out = String::new();
        out.push_str(&format!(
            "tick={} placed={} cleared={} failures={} commands={} (failed {})\n",
            self.gs.tick,
            self.totals.placed,
            self.totals.cleared,
            self.totals.failures,
            self.gs.world.commands_run,
            self.gs.world.commands_failed
        ));
        let mut dims: Vec<_> = self.gs.world.dimensions.keys().copied().collect();
        dims.sort_by_key(|d| d.0);
        for dim in dims {
            for (cell, level) in self.gs.world.light_blocks(dim, &cfg.light_block) {
                out.push_str(&format!("light {:?} {} level={}\n", dim, cell, level));
            }
        }
        let mut known: Vec<PlayerId> = self.gs.world.players.keys().copied().collect();
        for id in self.tagged_players() {
            if !known.contains(&id) {
                known.push(id);
            }
        }
        known.sort();
        for id in known {
            let online = self.gs.world.players.contains_key(&id);
            let tracked = self.gs.tags.get_tag(id, &cfg.tag_key);
            out.push_str(&format!(
                "{} {} {}={}\n",
                id,
                if online { "online" } else { "offline" },
                cfg.tag_key,
                tracked.as_deref().unwrap_or("-")
            ));
        }
        out
    }

    fn tagged_players(&self) -> Vec<PlayerId> {
        self.gs.tags.players()
    }
}
