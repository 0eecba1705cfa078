//! Agent Components
//!
//! Belief, dissonance and message bookkeeping for individual agents.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker component identifying an entity as an agent
#[derive(Component, Debug, Clone, Default)]
pub struct Agent;

/// Unique identifier for an agent. Assigned monotonically, never reused.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{:04}", self.0)
    }
}

/// Opinion value, kept within -1.0 to 1.0
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Belief(pub f32);

impl Belief {
    pub const MIN: f32 = -1.0;
    pub const MAX: f32 = 1.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// Shift the belief by `delta`, clamping to the valid range
    pub fn shift(&mut self, delta: f32) {
        self.0 = (self.0 + delta).clamp(Self::MIN, Self::MAX);
    }
}

/// Internal conflict pressure and the level at which it breaks out
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dissonance {
    /// Accumulated pressure from belief-incompatible messages
    pub current: f32,
    /// Constant set at creation
    pub threshold: f32,
}

impl Dissonance {
    pub fn new(threshold: f32) -> Self {
        Self {
            current: 0.0,
            threshold,
        }
    }

    /// Apply a change in dissonance, never dropping below `floor`
    pub fn update(&mut self, delta: f32, floor: f32) {
        self.current = (self.current + delta).max(floor);
    }

    /// Distance left before the threshold is reached
    pub fn margin(&self) -> f32 {
        self.threshold - self.current
    }

    /// Whether adding `pressure` would push dissonance past the threshold
    pub fn would_exceed(&self, pressure: f32) -> bool {
        self.current + pressure > self.threshold
    }
}

/// Monotonic message counters
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStats {
    /// Messages received
    pub contacts: u64,
    /// Messages that triggered the conflict branch
    pub conflicts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_belief_is_clamped() {
        let mut belief = Belief::new(0.9);
        belief.shift(0.5);
        assert_eq!(belief.0, 1.0);
        belief.shift(-3.0);
        assert_eq!(belief.0, -1.0);
        assert_eq!(Belief::new(-4.0).0, -1.0);
    }

    #[test]
    fn test_dissonance_floor_and_margin() {
        let mut dissonance = Dissonance::new(1.0);
        dissonance.update(0.4, 0.0);
        assert!((dissonance.margin() - 0.6).abs() < 1e-6);

        dissonance.update(-0.1, 0.0);
        assert!((dissonance.current - 0.3).abs() < 1e-6);

        dissonance.update(-1.0, 0.0);
        assert_eq!(dissonance.current, 0.0);

        // A negative floor lets dissonance go below zero
        dissonance.update(-0.5, -0.2);
        assert_eq!(dissonance.current, -0.2);
    }

    #[test]
    fn test_would_exceed() {
        let mut dissonance = Dissonance::new(0.5);
        dissonance.current = 0.4;
        assert!(!dissonance.would_exceed(0.1));
        assert!(dissonance.would_exceed(0.11));
    }

    #[test]
    fn test_agent_id_display() {
        assert_eq!(AgentId(7).to_string(), "agent_0007");
        assert_eq!(AgentId(12).index(), 12);
    }
}
