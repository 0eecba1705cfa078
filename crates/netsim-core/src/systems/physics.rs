//! Layout Physics
//!
//! One layout tick of the force-directed solver: clamped repulsion between
//! agents that are too close, springs along edges, an anchored first agent,
//! optional centering, then damped integration.
//!
//! Forces are computed from a snapshot of positions and edges taken at the
//! start of the tick, so the result does not depend on iteration order.

use bevy_ecs::prelude::*;
use glam::DVec2;

use crate::components::{AgentId, AgentIndex, Body, LayoutStats, SocialTies};
use crate::config::LayoutConfig;

/// The agent whose force is discarded every tick
pub const ANCHOR: AgentId = AgentId(0);

/// Net push and spring force on every agent for the given snapshot
pub fn compute_forces(
    positions: &[DVec2],
    neighbours: &[Vec<usize>],
    layout: &LayoutConfig,
) -> Vec<DVec2> {
    let mut forces = vec![DVec2::ZERO; positions.len()];

    for (i, &position) in positions.iter().enumerate() {
        // Repulsion only enforces a minimum distance; it never attracts
        for (j, &other) in positions.iter().enumerate() {
            if i == j {
                continue;
            }
            let distance = position.distance(other);
            if distance < layout.push_range {
                let push = layout.push_constant * (layout.push_range - distance);
                forces[i] += separation(i, position, j, other) * push;
            }
        }

        // Springs extend or contract toward the rest length
        for &n in &neighbours[i] {
            let Some(&other) = positions.get(n) else { continue };
            let distance = position.distance(other);
            let spring = layout.spring_constant * (layout.spring_length - distance);
            forces[i] += separation(i, position, n, other) * spring;
        }
    }

    forces
}

/// Unit vector pointing from `other` to `position`.
///
/// Coincident agents are split along the x axis, the lower index toward -x.
fn separation(i: usize, position: DVec2, j: usize, other: DVec2) -> DVec2 {
    let direction = (position - other).normalize_or_zero();
    if direction != DVec2::ZERO {
        direction
    } else if i < j {
        DVec2::NEG_X
    } else {
        DVec2::X
    }
}

/// System: clear velocity and force before accumulation
pub fn reset_motion(mut query: Query<&mut Body>) {
    for mut body in query.iter_mut() {
        body.reset();
    }
}

/// System: accumulate repulsion and spring forces
pub fn accumulate_forces(
    layout: Res<LayoutConfig>,
    index: Res<AgentIndex>,
    mut query: Query<(&SocialTies, &mut Body)>,
) {
    let mut positions = Vec::with_capacity(index.len());
    let mut neighbours = Vec::with_capacity(index.len());
    for (_, entity) in index.iter() {
        match query.get(entity) {
            Ok((ties, body)) => {
                positions.push(body.position);
                neighbours.push(ties.neighbours().iter().map(|n| n.index()).collect());
            }
            Err(_) => {
                positions.push(DVec2::ZERO);
                neighbours.push(Vec::new());
            }
        }
    }

    let forces = compute_forces(&positions, &neighbours, &layout);

    for ((_, entity), force) in index.iter().zip(forces) {
        if let Ok((_, mut body)) = query.get_mut(entity) {
            body.add_force(force);
        }
    }
}

/// System: drop the anchor's force so the layout does not drift as a whole
pub fn anchor_first_agent(index: Res<AgentIndex>, mut query: Query<&mut Body>) {
    let Some(entity) = index.entity(ANCHOR) else {
        return;
    };
    if let Ok(mut body) = query.get_mut(entity) {
        body.force = DVec2::ZERO;
    }
}

/// System: nudge every agent but the anchor toward the focal point
pub fn apply_centering(layout: Res<LayoutConfig>, mut query: Query<(&AgentId, &mut Body)>) {
    if !layout.centering_enabled {
        return;
    }
    for (id, mut body) in query.iter_mut() {
        if *id == ANCHOR {
            continue;
        }
        let pull = (layout.center - body.position).normalize_or_zero() * layout.center_strength;
        body.add_force(pull);
    }
}

/// System: damp velocities and move every agent
pub fn integrate_motion(
    layout: Res<LayoutConfig>,
    mut stats: ResMut<LayoutStats>,
    mut query: Query<&mut Body>,
) {
    let mut displacement = 0.0;
    for mut body in query.iter_mut() {
        body.dampen(layout.damping);
        displacement += body.transfer_force();
    }
    stats.ticks += 1;
    stats.last_displacement = displacement;
}
