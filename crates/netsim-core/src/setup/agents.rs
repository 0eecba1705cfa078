//! Agent Spawning
//!
//! Spawns agents with randomized initial state and wires the initial topology
//! into the world.

use bevy_ecs::prelude::*;
use bevy_ecs::system::RunSystemOnce;
use glam::DVec2;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::components::{
    link_agents, Agent, AgentId, AgentIndex, Belief, Body, Dissonance, MessageStats, SocialTies,
};
use crate::config::AgentConfig;
use crate::error::SimError;
use crate::systems::promote_confidants;
use crate::SimRng;

use super::topology;

/// Spawn one agent with randomized belief, threshold and connection limit.
/// The agent starts with no edges.
pub fn spawn_agent(
    world: &mut World,
    rng: &mut SmallRng,
    config: &AgentConfig,
    position: DVec2,
) -> AgentId {
    let belief = rng.gen_range(Belief::MIN..Belief::MAX);
    let threshold = rng.gen_range(config.threshold_min..=config.threshold_max);
    let connection_limit =
        rng.gen_range(config.connection_limit_min..=config.connection_limit_max);

    let entity = world
        .spawn((
            Agent,
            Belief::new(belief),
            Dissonance::new(threshold),
            SocialTies::new(connection_limit),
            MessageStats::default(),
            Body::at(position),
        ))
        .id();

    let id = world.resource_mut::<AgentIndex>().register(entity);
    world.entity_mut(entity).insert(id);
    id
}

/// Create `agent_count` agents and connect them with the topology builder.
///
/// Agents receive ids `0..agent_count`. Initial confidants are promoted from
/// the new neighbours before returning.
pub fn build_network(world: &mut World, agent_count: usize) -> Result<(), SimError> {
    if agent_count <= topology::MIN_AGENTS {
        return Err(SimError::InvalidConfiguration(format!(
            "network needs more than {} agents, got {}",
            topology::MIN_AGENTS,
            agent_count
        )));
    }

    let config = world.resource::<AgentConfig>().clone();

    let topology = world.resource_scope(|world, mut rng: Mut<SimRng>| {
        for _ in 0..agent_count {
            spawn_agent(world, &mut rng.0, &config, DVec2::ZERO);
        }
        topology::build(agent_count, &mut rng.0)
    })?;

    // Replaying edges in creation order keeps neighbour lists in that order
    for &(a, b) in topology.edges() {
        link_agents(world, AgentId(a), AgentId(b));
    }

    world.run_system_once(promote_confidants);

    tracing::info!(
        agents = agent_count,
        edges = topology.edges().len(),
        "network built"
    );
    Ok(())
}
