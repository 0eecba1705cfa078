//! Recommendation Engine
//!
//! Chooses which peers an agent hears from during an epoch.

use rand::rngs::SmallRng;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::components::AgentId;
use crate::error::SimError;

/// Algorithms for building a recommendation set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendStrategy {
    /// Uniform draws from the whole network, duplicates allowed
    Random,
}

impl FromStr for RecommendStrategy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(RecommendStrategy::Random),
            other => Err(SimError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for RecommendStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendStrategy::Random => write!(f, "random"),
        }
    }
}

/// Build a recommendation set of `size` agents for `agent` out of a
/// population with ids `0..population`. Never includes `agent` itself.
/// Returns fewer agents only when nobody else exists.
pub fn recommend_with(
    strategy: RecommendStrategy,
    agent: AgentId,
    size: usize,
    population: usize,
    rng: &mut SmallRng,
) -> Vec<AgentId> {
    let others = population.saturating_sub(usize::from(agent.index() < population));
    if others == 0 {
        return Vec::new();
    }

    match strategy {
        RecommendStrategy::Random => {
            let mut recommended = Vec::with_capacity(size);
            while recommended.len() < size {
                let candidate = AgentId(rng.gen_range(0..population) as u32);
                if candidate != agent {
                    recommended.push(candidate);
                }
            }
            recommended
        }
    }
}

/// Build a recommendation set by strategy name.
///
/// An unknown name is not fatal: it is logged and yields an empty set.
pub fn recommend(
    agent: AgentId,
    size: usize,
    strategy: &str,
    population: usize,
    rng: &mut SmallRng,
) -> Vec<AgentId> {
    match strategy.parse::<RecommendStrategy>() {
        Ok(strategy) => recommend_with(strategy, agent, size, population, rng),
        Err(e) => {
            tracing::warn!(%agent, "{}; no messages delivered", e);
            Vec::new()
        }
    }
}
