//! Opinion Dynamics
//!
//! Per-epoch message delivery, belief influence and dissonance decay.

use bevy_ecs::prelude::*;

use crate::components::{
    AgentId, AgentIndex, Belief, Dissonance, EpochClock, MessageStats, SocialTies,
};
use crate::config::{AgentConfig, InfluenceConfig};
use crate::SimRng;

use super::recommend::{recommend_with, RecommendStrategy};

/// Outcome of processing a single message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Belief moved toward the sender
    Influenced,
    /// Dissonance would have crossed the threshold; the message was rejected
    Conflict,
}

/// Apply one incoming message to an agent's belief and dissonance.
///
/// The receiver adopts `weight * gap` of the belief gap, where `weight`
/// depends on whether the sender is a confidant, and gains dissonance in
/// proportion to the weighted gap. If that gain would cross the threshold
/// the conflict branch runs instead: belief backfires away from the sender
/// and dissonance is partly released.
pub fn receive_message(
    rule: &InfluenceConfig,
    belief: &mut Belief,
    dissonance: &mut Dissonance,
    is_confidant: bool,
    sender_belief: f32,
) -> MessageOutcome {
    let gap = sender_belief - belief.0;
    let weight = if is_confidant {
        rule.confidant_weight
    } else {
        rule.stranger_weight
    };
    let pressure = rule.dissonance_gain * weight * gap.abs();

    if dissonance.would_exceed(pressure) {
        belief.shift(-rule.backfire * weight * gap);
        dissonance.current *= rule.conflict_relief;
        MessageOutcome::Conflict
    } else {
        belief.shift(weight * gap);
        dissonance.current += pressure;
        MessageOutcome::Influenced
    }
}

/// Process a full recommendation set for one agent
pub fn receive_messages(
    rule: &InfluenceConfig,
    belief: &mut Belief,
    dissonance: &mut Dissonance,
    ties: &SocialTies,
    stats: &mut MessageStats,
    senders: &[(AgentId, f32)],
) {
    for &(sender, sender_belief) in senders {
        stats.contacts += 1;
        let outcome = receive_message(
            rule,
            belief,
            dissonance,
            ties.is_confidant(sender),
            sender_belief,
        );
        if outcome == MessageOutcome::Conflict {
            stats.conflicts += 1;
        }
    }
}

/// System: deliver one round of recommended messages to every agent.
///
/// Agents are processed in id order and read their senders' beliefs as
/// already updated earlier in the same epoch.
pub fn deliver_messages(
    mut sim_rng: ResMut<SimRng>,
    index: Res<AgentIndex>,
    influence: Res<InfluenceConfig>,
    mut query: Query<(&mut Belief, &mut Dissonance, &SocialTies, &mut MessageStats)>,
) {
    let strategy = match influence.strategy.parse::<RecommendStrategy>() {
        Ok(strategy) => strategy,
        Err(e) => {
            tracing::warn!("{}; no messages delivered this epoch", e);
            return;
        }
    };

    let rng = &mut sim_rng.0;
    let population = index.len();

    for (id, entity) in index.iter() {
        let recommended = recommend_with(
            strategy,
            id,
            influence.recommendation_size,
            population,
            rng,
        );

        let senders: Vec<(AgentId, f32)> = recommended
            .into_iter()
            .filter_map(|sender| {
                let sender_entity = index.entity(sender)?;
                let (belief, ..) = query.get(sender_entity).ok()?;
                Some((sender, belief.0))
            })
            .collect();

        let Ok((mut belief, mut dissonance, ties, mut stats)) = query.get_mut(entity) else {
            continue;
        };
        receive_messages(
            &influence,
            &mut belief,
            &mut dissonance,
            ties,
            &mut stats,
            &senders,
        );
    }
}

/// System: relax every agent's dissonance by the configured decay
pub fn decay_dissonance(agents: Res<AgentConfig>, mut query: Query<&mut Dissonance>) {
    for mut dissonance in query.iter_mut() {
        dissonance.update(-agents.dissonance_decay, agents.dissonance_floor);
    }
}

/// System: mark the epoch complete
pub fn advance_epoch(mut clock: ResMut<EpochClock>) {
    let epoch = clock.advance();
    tracing::debug!(epoch, "epoch complete");
}
