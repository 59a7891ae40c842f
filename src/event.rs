use std::collections::{BTreeMap, VecDeque};

use torchlight_geom::Vec3;
use torchlight_tracker::{DimensionId, PlayerId};

pub enum Event {
    // Time housekeeping
    Tick,

    // Player lifecycle
    PlayerJoined {
        player: PlayerId,
        dimension: DimensionId,
        spawn: Vec3,
        item: Option<String>,
    },
    PlayerLeft { player: PlayerId },
    PlayerTravelled {
        player: PlayerId,
        dimension: DimensionId,
        to: Vec3,
    },

    // Input-derived intents
    PlayerMoved { player: PlayerId, to: Vec3 },
    HeldItemChanged { player: PlayerId, item: Option<String> },
}

pub struct EventEnvelope {
    pub id: u64,
    pub tick: u64,
    pub kind: Event,
}

pub struct EventQueue {
    // map of tick -> FIFO queue of events
    by_tick: BTreeMap<u64, VecDeque<EventEnvelope>>,
    pub now: u64,
    next_id: u64,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self { by_tick: BTreeMap::new(), now: 0, next_id: 1 }
    }
}

impl EventQueue {
    pub fn new() -> Self { Self::default() }

    #[inline]
    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    pub fn emit_now(&mut self, kind: Event) -> u64 {
        self.emit_at(self.now, kind)
    }

    /// Schedules `kind` for `tick`; ticks already in the past run on the current one.
    pub fn emit_at(&mut self, tick: u64, kind: Event) -> u64 {
        let tick = tick.max(self.now);
        let id = self.alloc_id();
        let env = EventEnvelope { id, tick, kind };
        self.by_tick.entry(tick).or_default().push_back(env);
        id
    }

    pub fn pop_ready(&mut self) -> Option<EventEnvelope> {
        let q = self.by_tick.get_mut(&self.now)?;
        let env = q.pop_front();
        if q.is_empty() {
            self.by_tick.remove(&self.now);
        }
        env
    }

    pub fn advance_tick(&mut self) {
        // Anything still queued for this tick is dropped
        self.by_tick.remove(&self.now);
        self.now = self.now.wrapping_add(1);
    }

    pub fn pending(&self) -> usize {
        self.by_tick.values().map(|q| q.len()).sum()
    }
}
