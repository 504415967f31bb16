//! Per-tick counters.
//!
//! Nothing in a tick can fail, but some things can go less than perfectly:
//! a move that never found open space, a coincident pair that could not be
//! nudged apart. Those are counted here so callers can log or surface them.
//! Contacts blocked by a wall are routine in settled fluid and are only
//! counted, not treated as faults.

use std::ops::AddAssign;

/// Outcome of one or more collision passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Overlapping pairs that were pushed apart.
    pub contacts: u32,
    /// Overlapping pairs left alone because every push entered a solid.
    pub blocked: u32,
    /// Coincident pairs that could not be nudged apart.
    pub degenerate: u32,
}

impl AddAssign for CollisionStats {
    fn add_assign(&mut self, other: Self) {
        self.contacts += other.contacts;
        self.blocked += other.blocked;
        self.degenerate += other.degenerate;
    }
}

/// Summary of a single [`step`](super::FlipSimulation::step).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepStats {
    pub tick: u64,
    /// Moves that hit the solid-correction cap and were reverted.
    pub solid_overruns: u32,
    pub collisions: CollisionStats,
    /// Sum of |divergence| over water cells after P2G.
    pub divergence_before: f32,
    /// Same measure after the solve.
    pub divergence_after: f32,
    /// Total particle kinetic energy at unit mass, after G2P.
    pub kinetic_energy: f32,
}

impl StepStats {
    /// Reverted moves plus coincident pairs left in place.
    pub fn soft_faults(&self) -> u32 {
        self.solid_overruns + self.collisions.degenerate
    }
}
