//! World State
//!
//! Simulation-wide bookkeeping resources.

use bevy_ecs::prelude::*;

/// Resource: number of completed opinion epochs
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct EpochClock {
    pub epoch: u64,
}

impl EpochClock {
    pub fn advance(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }
}

/// Resource: motion measured during the most recent layout tick
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct LayoutStats {
    pub ticks: u64,
    /// Sum of per-agent displacement in the last tick
    pub last_displacement: f64,
}
