//! Deterministic random number generation.
//!
//! RULE: Nothing in the dashboard core may call a platform RNG.
//! All randomness flows through a `RandomSource`. In normal operation
//! that is a SubsystemRng derived from the run's master seed; tests
//! may substitute any source (for instance one that pins every draw).
//!
//! Each component gets its own stream, seeded deterministically
//! from (master_seed XOR slot_index). This means:
//!   - Adding a new component never changes existing components' streams.
//!   - Each component's stream is fully reproducible in isolation.

use crate::types::Tick;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

const SLOT_MIX: u64 = 0x9e37_79b9_7f4a_7c15;
const TICK_MIX: u64 = 0xbf58_476d_1ce4_e5b9;

/// Anything that can hand out uniform draws in [0.0, 1.0).
pub trait RandomSource {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Uniform draw in [low, high).
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// A deterministic RNG for a single component.
pub struct SubsystemRng {
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create an RNG from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ slot_index.wrapping_mul(SLOT_MIX);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }
}

impl RandomSource for SubsystemRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// All component RNGs for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// One long-lived stream per slot.
    pub fn for_subsystem(&self, slot: SubsystemSlot) -> SubsystemRng {
        SubsystemRng::new(self.master_seed, slot as u64)
    }

    /// A fresh stream for one tick of one slot. Two ticks never share
    /// a stream, and replaying tick N reproduces exactly the same draws.
    pub fn for_subsystem_at_tick(&self, slot: SubsystemSlot, tick: Tick) -> SubsystemRng {
        let seed = self.master_seed ^ tick.wrapping_add(1).wrapping_mul(TICK_MIX);
        SubsystemRng::new(seed, slot as u64)
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries. Append only.
/// Reordering changes every component's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    History = 0,
    Snapshot = 1,
    Live = 2,
    Projection = 3,
    Indicators = 4,
    // Add new components here.
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Snapshot => "snapshot",
            Self::Live => "live",
            Self::Projection => "projection",
            Self::Indicators => "indicators",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngBank::new(7).for_subsystem(SubsystemSlot::History);
        let mut b = RngBank::new(7).for_subsystem(SubsystemSlot::History);
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn slots_and_ticks_get_distinct_streams() {
        let bank = RngBank::new(7);
        let first = |mut rng: SubsystemRng| rng.next_u64();

        let history = first(bank.for_subsystem(SubsystemSlot::History));
        let live = first(bank.for_subsystem(SubsystemSlot::Live));
        assert_ne!(history, live);

        let tick_1 = first(bank.for_subsystem_at_tick(SubsystemSlot::Live, 1));
        let tick_2 = first(bank.for_subsystem_at_tick(SubsystemSlot::Live, 2));
        assert_ne!(tick_1, tick_2);
        assert_eq!(tick_1, first(bank.for_subsystem_at_tick(SubsystemSlot::Live, 1)));
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = RngBank::new(99).for_subsystem(SubsystemSlot::Snapshot);
        for _ in 0..1_000 {
            let x = rng.uniform(0.8, 1.2);
            assert!((0.8..=1.2).contains(&x), "draw {x} escaped [0.8, 1.2]");
        }
    }
}
