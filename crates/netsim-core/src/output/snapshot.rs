//! Snapshot Generation
//!
//! Reads every agent's public fields into the shared snapshot types.

use bevy_ecs::prelude::*;
use netsim_events::{
    average_belief, AgentRecord, EdgeSnapshot, EpochSnapshot, LayoutSnapshot, NodePosition,
};

use crate::components::{
    AgentId, AgentIndex, Belief, Body, Dissonance, EpochClock, MessageStats, SocialTies,
};

/// One record per live agent, in id order
pub fn collect_epoch_snapshot(world: &World) -> EpochSnapshot {
    let epoch = world.resource::<EpochClock>().epoch;
    let index = world.resource::<AgentIndex>();
    let mut snapshot = EpochSnapshot::new(epoch);

    let belief_of = |id: AgentId| {
        index
            .entity(id)
            .and_then(|e| world.get::<Belief>(e))
            .map(|b| b.0)
            .unwrap_or_default()
    };

    for (id, entity) in index.iter() {
        let (Some(belief), Some(dissonance), Some(ties), Some(stats)) = (
            world.get::<Belief>(entity),
            world.get::<Dissonance>(entity),
            world.get::<SocialTies>(entity),
            world.get::<MessageStats>(entity),
        ) else {
            continue;
        };

        snapshot.agents.push(AgentRecord {
            epoch,
            id: id.0,
            belief: belief.0,
            threshold_margin: dissonance.margin(),
            current_dissonance: dissonance.current,
            neighbour_count: ties.degree(),
            avg_neighbour_belief: average_belief(ties.neighbours().iter().map(|&n| belief_of(n))),
            confidant_count: ties.confidants().len(),
            avg_confidant_belief: average_belief(ties.confidants().iter().map(|&n| belief_of(n))),
            contact_count: stats.contacts,
            conflict_count: stats.conflicts,
        });
    }

    snapshot
}

/// Positions and edges of every agent, edges listed once with `a < b`
pub fn collect_layout(world: &World) -> LayoutSnapshot {
    let epoch = world.resource::<EpochClock>().epoch;
    let index = world.resource::<AgentIndex>();
    let mut layout = LayoutSnapshot {
        epoch,
        ..LayoutSnapshot::default()
    };

    for (id, entity) in index.iter() {
        if let Some(body) = world.get::<Body>(entity) {
            layout.nodes.push(NodePosition {
                id: id.0,
                x: body.position.x,
                y: body.position.y,
                belief: world.get::<Belief>(entity).map(|b| b.0).unwrap_or_default(),
            });
        }
        if let Some(ties) = world.get::<SocialTies>(entity) {
            layout.edges.extend(
                ties.neighbours()
                    .iter()
                    .filter(|n| id < **n)
                    .map(|n| EdgeSnapshot::new(id.0, n.0)),
            );
        }
    }

    layout.edges.sort_unstable();
    layout
}
