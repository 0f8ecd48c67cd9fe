//! Live subsystem: simulates real-time revenue ticks on the snapshot.
//!
//! Each tick, every row independently has a `change_probability`
//! chance of receiving a new change drawn from U(-0.03, 0.03).
//! Selected rows get their revenue, variation and import volume
//! updated; unselected rows are left untouched.
//!
//! The subsystem is the only writer of the snapshot. It receives it by
//! exclusive reference from the engine, so readers never observe a
//! half-applied tick.

use crate::{
    event::SimEvent,
    rng::RandomSource,
    snapshot::Snapshot,
    types::Tick,
};

pub const LIVE_CHANGE_PROBABILITY: f64 = 0.4;
pub const LIVE_CHANGE_BOUND: f64 = 0.03;

pub struct LiveSubsystem {
    change_probability: f64,
}

impl Default for LiveSubsystem {
    fn default() -> Self {
        Self::new(LIVE_CHANGE_PROBABILITY)
    }
}

impl LiveSubsystem {
    pub fn new(change_probability: f64) -> Self {
        Self { change_probability }
    }

    pub fn name(&self) -> &'static str {
        "live"
    }

    pub fn update<R: RandomSource>(
        &self,
        tick: Tick,
        snapshot: &mut Snapshot,
        rng: &mut R,
    ) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for row in snapshot.rows_mut() {
            if !rng.chance(self.change_probability) {
                continue;
            }
            let change = rng.uniform(-LIVE_CHANGE_BOUND, LIVE_CHANGE_BOUND);
            row.apply_change(change);
            row.import_volume *= rng.uniform(0.95, 1.05);

            events.push(SimEvent::SectorRevenueUpdated {
                tick,
                sector_code: row.sector_code.clone(),
                monthly_revenue: row.monthly_revenue,
                variation_pct: row.variation_pct,
                import_volume: row.import_volume,
            });
        }
        log::debug!("Tick {tick}: {} sectors updated", events.len());
        events
    }
}
