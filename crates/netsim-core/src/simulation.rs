//! Simulation
//!
//! Owns the ECS world and the three schedules that mutate it. Every public
//! operation runs to completion before returning, so a caller holding the
//! simulation never observes a partially updated agent.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use netsim_events::{EpochSnapshot, LayoutSnapshot};

use crate::components::{
    link_agents, AgentId, AgentIndex, Body, Dissonance, EpochClock, LayoutStats, SocialTies,
};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::output::{collect_epoch_snapshot, collect_layout};
use crate::setup::{self, spawn_agent};
use crate::systems::{
    accumulate_forces, advance_epoch, anchor_first_agent, apply_centering, decay_dissonance,
    deliver_messages, fraternize, integrate_motion, promote_confidants, reset_motion,
};
use crate::SimRng;

pub struct Simulation {
    world: World,
    epoch_schedule: Schedule,
    physics_schedule: Schedule,
    fraternize_schedule: Schedule,
    config: SimConfig,
}

impl Simulation {
    /// Build the network described by `config` and give it an initial layout
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let mut world = World::new();
        world.insert_resource(SimRng(SmallRng::seed_from_u64(config.simulation.seed)));
        world.insert_resource(AgentIndex::new());
        world.insert_resource(EpochClock::default());
        world.insert_resource(LayoutStats::default());
        world.insert_resource(config.simulation.clone());
        world.insert_resource(config.agents.clone());
        world.insert_resource(config.influence.clone());
        world.insert_resource(config.social.clone());
        world.insert_resource(config.layout.clone());

        setup::build_network(&mut world, config.simulation.agent_count)?;
        let placed = setup::place_initial(&mut world);
        tracing::info!(seed = config.simulation.seed, placed, "simulation ready");

        Ok(Self {
            world,
            epoch_schedule: single_threaded(
                (deliver_messages, decay_dissonance, advance_epoch).chain(),
            ),
            physics_schedule: single_threaded(
                (
                    reset_motion,
                    accumulate_forces,
                    anchor_first_agent,
                    apply_centering,
                    integrate_motion,
                )
                    .chain(),
            ),
            fraternize_schedule: single_threaded((fraternize, promote_confidants).chain()),
            config,
        })
    }

    /// Run one opinion epoch and return the state it left behind
    pub fn step_epoch(&mut self) -> EpochSnapshot {
        self.epoch_schedule.run(&mut self.world);
        collect_epoch_snapshot(&self.world)
    }

    /// Run one layout tick; returns the summed displacement of all agents
    pub fn tick_layout(&mut self) -> f64 {
        self.physics_schedule.run(&mut self.world);
        self.world.resource::<LayoutStats>().last_displacement
    }

    /// Propose new edges between agents below their connection limit
    pub fn fraternize(&mut self) {
        self.fraternize_schedule.run(&mut self.world);
    }

    /// Re-run breadth-first placement over the current graph
    pub fn place_initial(&mut self) -> usize {
        setup::place_initial(&mut self.world)
    }

    /// Add one agent linked to the agent at `index`, placed at an offset from it
    pub fn grow_at(&mut self, index: usize) -> Result<AgentId, SimError> {
        let len = self.agent_count();
        let parent_id = AgentId(index as u32);
        let parent = match self.world.resource::<AgentIndex>().entity(parent_id) {
            Some(entity) if index < len => entity,
            _ => return Err(SimError::IndexOutOfRange { index, len }),
        };

        let origin = self
            .world
            .get::<Body>(parent)
            .map(|body| body.position)
            .unwrap_or(self.config.layout.origin);
        let position = origin + self.config.layout.growth_offset;
        let agents = self.config.agents.clone();

        let id = self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            spawn_agent(world, &mut rng.0, &agents, position)
        });
        link_agents(&mut self.world, parent_id, id);

        tracing::info!(parent = index, agent = %id, "agent grown");
        Ok(id)
    }

    /// Apply one dissonance delta to every agent
    pub fn update_dissonances(&mut self, delta: f32) {
        let floor = self.config.agents.dissonance_floor;
        let mut query = self.world.query::<&mut Dissonance>();
        for mut dissonance in query.iter_mut(&mut self.world) {
            dissonance.update(delta, floor);
        }
    }

    /// State of every agent after the most recently completed epoch
    pub fn snapshot(&self) -> EpochSnapshot {
        collect_epoch_snapshot(&self.world)
    }

    pub fn layout(&self) -> LayoutSnapshot {
        collect_layout(&self.world)
    }

    pub fn agent_count(&self) -> usize {
        self.world.resource::<AgentIndex>().len()
    }

    /// Every undirected edge once, as `(lower, higher)` ids in sorted order
    pub fn edges(&self) -> Vec<(AgentId, AgentId)> {
        let index = self.world.resource::<AgentIndex>();
        let mut edges = Vec::new();
        for (id, entity) in index.iter() {
            let Some(ties) = self.world.get::<SocialTies>(entity) else {
                continue;
            };
            for &other in ties.neighbours() {
                if id < other {
                    edges.push((id, other));
                }
            }
        }
        edges.sort();
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges().len()
    }

    pub fn epoch(&self) -> u64 {
        self.world.resource::<EpochClock>().epoch
    }

    pub fn layout_ticks(&self) -> u64 {
        self.world.resource::<LayoutStats>().ticks
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

fn single_threaded<M>(systems: impl IntoSystemConfigs<M>) -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(systems);
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(agent_count: usize, seed: u64) -> SimConfig {
        let mut config = SimConfig::default();
        config.simulation.agent_count = agent_count;
        config.simulation.seed = seed;
        config
    }

    #[test]
    fn test_too_few_agents_is_rejected() {
        let result = Simulation::new(config(5, 1));
        assert!(matches!(result, Err(SimError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_step_epoch_counts_contacts() {
        let mut sim = Simulation::new(config(12, 3)).unwrap();
        let snapshot = sim.step_epoch();

        assert_eq!(snapshot.epoch, 1);
        assert_eq!(snapshot.len(), 12);
        assert!(snapshot.agents.iter().all(|r| r.contact_count == 5));
        assert_eq!(sim.epoch(), 1);
    }

    #[test]
    fn test_grow_at_links_to_parent() {
        let mut sim = Simulation::new(config(8, 5)).unwrap();
        let edges_before = sim.edge_count();

        let id = sim.grow_at(2).unwrap();

        assert_eq!(id, AgentId(8));
        assert_eq!(sim.agent_count(), 9);
        assert_eq!(sim.edge_count(), edges_before + 1);
        assert!(sim.edges().contains(&(AgentId(2), AgentId(8))));
    }

    #[test]
    fn test_grown_agent_starts_offset_from_parent() {
        let mut sim = Simulation::new(config(8, 5)).unwrap();
        let layout = sim.layout();
        let parent = *layout.nodes.iter().find(|n| n.id == 3).unwrap();

        sim.grow_at(3).unwrap();

        let layout = sim.layout();
        let child = layout.nodes.iter().find(|n| n.id == 8).unwrap();
        assert!((child.x - (parent.x + 150.0)).abs() < 1e-9);
        assert!((child.y - (parent.y + 150.0)).abs() < 1e-9);
    }

    #[test]
    fn test_grow_at_out_of_range_leaves_network_alone() {
        let mut sim = Simulation::new(config(8, 5)).unwrap();
        let edges_before = sim.edges();

        let result = sim.grow_at(8);

        assert_eq!(result, Err(SimError::IndexOutOfRange { index: 8, len: 8 }));
        assert_eq!(sim.agent_count(), 8);
        assert_eq!(sim.edges(), edges_before);
    }

    #[test]
    fn test_update_dissonances_respects_floor() {
        let mut sim = Simulation::new(config(8, 5)).unwrap();
        sim.update_dissonances(0.4);
        assert!(sim
            .snapshot()
            .agents
            .iter()
            .all(|r| (r.current_dissonance - 0.4).abs() < 1e-6));

        sim.update_dissonances(-1.0);
        assert!(sim.snapshot().agents.iter().all(|r| r.current_dissonance == 0.0));
    }

    #[test]
    fn test_tick_layout_counts_ticks() {
        let mut sim = Simulation::new(config(10, 9)).unwrap();
        sim.tick_layout();
        sim.tick_layout();
        assert_eq!(sim.layout_ticks(), 2);
    }
}
