//! Initial Placement
//!
//! Breadth-first radial placement from the anchor agent. Gives the force
//! solver a tree-like starting layout instead of a pile at the origin.

use bevy_ecs::prelude::*;
use glam::DVec2;
use rand::Rng;
use std::collections::VecDeque;
use std::f64::consts::TAU;

use crate::components::{AgentIndex, Body, SocialTies};
use crate::config::LayoutConfig;
use crate::SimRng;

/// Position every agent reachable from agent 0.
///
/// The anchor is pinned at `origin`. Each visited agent spreads its unvisited
/// neighbours evenly around a circle of radius `link_distance`, offset by a
/// small random jitter. Returns the number of agents placed.
pub fn place_initial(world: &mut World) -> usize {
    let config = world.resource::<LayoutConfig>().clone();

    let neighbour_lists: Vec<Vec<usize>> = {
        let index = world.resource::<AgentIndex>();
        index
            .iter()
            .map(|(_, entity)| {
                world
                    .get::<SocialTies>(entity)
                    .map(|ties| ties.neighbours().iter().map(|n| n.index()).collect())
                    .unwrap_or_default()
            })
            .collect()
    };
    if neighbour_lists.is_empty() {
        return 0;
    }

    let mut positions: Vec<Option<DVec2>> = vec![None; neighbour_lists.len()];
    positions[0] = Some(config.origin);

    world.resource_scope(|_, mut rng: Mut<SimRng>| {
        let rng = &mut rng.0;
        let mut queue = VecDeque::from([0usize]);

        while let Some(current) = queue.pop_front() {
            let centre = positions[current].unwrap_or(config.origin);
            let neighbours = &neighbour_lists[current];
            let angle = TAU / neighbours.len() as f64;

            for (slot, &neighbour) in neighbours.iter().enumerate() {
                if positions[neighbour].is_some() {
                    continue;
                }

                // Jitter breaks exact overlaps
                let jitter = DVec2::new(
                    rng.gen::<f64>() * config.jitter,
                    rng.gen::<f64>() * config.jitter,
                );
                let direction = DVec2::from_angle(angle * slot as f64);
                positions[neighbour] = Some(centre + direction * config.link_distance + jitter);
                queue.push_back(neighbour);
            }
        }
    });

    let index_entities: Vec<Entity> = world.resource::<AgentIndex>().iter().map(|(_, e)| e).collect();
    let mut placed = 0;
    for (entity, position) in index_entities.into_iter().zip(positions) {
        let Some(position) = position else { continue };
        if let Some(mut body) = world.get_mut::<Body>(entity) {
            *body = Body::at(position);
            placed += 1;
        }
    }

    tracing::debug!(placed, "initial placement complete");
    placed
}
