//! Fraternization
//!
//! Organic growth of the social graph and promotion of trusted neighbours.

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::components::{AgentId, AgentIndex, Belief, SocialTies};
use crate::config::SocialConfig;
use crate::SimRng;

/// System: let agents below their connection limit propose new edges.
///
/// Each eligible agent, in id order, proposes with `fraternize_chance` an
/// edge to a uniformly drawn agent. Proposals to itself, to an existing
/// neighbour, or to an agent already at its limit are skipped.
pub fn fraternize(
    mut sim_rng: ResMut<SimRng>,
    index: Res<AgentIndex>,
    social: Res<SocialConfig>,
    mut query: Query<&mut SocialTies>,
) {
    let population = index.len();
    if population < 2 {
        return;
    }
    let rng = &mut sim_rng.0;

    // Work on a copy so limits see edges formed earlier in this pass
    let mut ties: Vec<SocialTies> = index
        .iter()
        .map(|(_, entity)| query.get(entity).map(|t| t.clone()).unwrap_or_default())
        .collect();

    let mut new_edges = Vec::new();
    for agent in 0..population {
        if !ties[agent].below_limit() || !rng.gen_bool(social.fraternize_chance) {
            continue;
        }

        let candidate = rng.gen_range(0..population);
        if candidate == agent
            || ties[agent].is_neighbour(AgentId(candidate as u32))
            || !ties[candidate].below_limit()
        {
            continue;
        }

        ties[agent].add_neighbour(AgentId(candidate as u32));
        ties[candidate].add_neighbour(AgentId(agent as u32));
        new_edges.push((AgentId(agent as u32), AgentId(candidate as u32)));
    }

    for &(a, b) in &new_edges {
        for (from, to) in [(a, b), (b, a)] {
            let Some(entity) = index.entity(from) else { continue };
            if let Ok(mut from_ties) = query.get_mut(entity) {
                from_ties.add_neighbour(to);
            }
        }
    }

    tracing::debug!(new_edges = new_edges.len(), "fraternization pass");
}

/// System: promote neighbours whose belief is close to an agent's own
/// to confidants. Confidants are never demoted.
pub fn promote_confidants(
    index: Res<AgentIndex>,
    social: Res<SocialConfig>,
    mut query: Query<(&Belief, &mut SocialTies)>,
) {
    let beliefs: Vec<f32> = index
        .iter()
        .map(|(_, entity)| query.get(entity).map(|(b, _)| b.0).unwrap_or_default())
        .collect();

    for (_, entity) in index.iter() {
        let Ok((belief, mut ties)) = query.get_mut(entity) else {
            continue;
        };
        let close: Vec<AgentId> = ties
            .neighbours()
            .iter()
            .copied()
            .filter(|n| {
                beliefs
                    .get(n.index())
                    .is_some_and(|b| (b - belief.0).abs() <= social.confidant_affinity)
            })
            .filter(|n| !ties.is_confidant(*n))
            .collect();

        for neighbour in close {
            ties.add_confidant(neighbour);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::link_agents;
    use bevy_ecs::system::RunSystemOnce;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn world_with(beliefs: &[f32], limit: usize, chance: f64) -> World {
        let mut world = World::new();
        world.insert_resource(SimRng(SmallRng::seed_from_u64(21)));
        world.insert_resource(SocialConfig {
            fraternize_chance: chance,
            confidant_affinity: 0.25,
        });
        let mut index = AgentIndex::new();
        for &belief in beliefs {
            let entity = world.spawn((Belief::new(belief), SocialTies::new(limit))).id();
            index.register(entity);
        }
        world.insert_resource(index);
        world
    }

    fn ties_of(world: &World, id: u32) -> SocialTies {
        let entity = world.resource::<AgentIndex>().entity(AgentId(id)).unwrap();
        world.get::<SocialTies>(entity).unwrap().clone()
    }

    #[test]
    fn test_fraternize_respects_limits() {
        let mut world = world_with(&[0.0; 12], 3, 1.0);
        for _ in 0..20 {
            world.run_system_once(fraternize);
        }

        let mut total_degree = 0;
        for id in 0..12 {
            let ties = ties_of(&world, id);
            assert!(ties.degree() <= 3);
            assert!(!ties.is_neighbour(AgentId(id)));
            for n in ties.neighbours() {
                assert!(ties_of(&world, n.0).is_neighbour(AgentId(id)));
            }
            total_degree += ties.degree();
        }
        assert!(total_degree > 0);
    }

    #[test]
    fn test_zero_chance_adds_nothing() {
        let mut world = world_with(&[0.0; 8], 5, 0.0);
        world.run_system_once(fraternize);
        for id in 0..8 {
            assert_eq!(ties_of(&world, id).degree(), 0);
        }
    }

    #[test]
    fn test_promote_confidants_by_belief_distance() {
        let mut world = world_with(&[0.0, 0.2, 0.9], 5, 0.0);
        link_agents(&mut world, AgentId(0), AgentId(1));
        link_agents(&mut world, AgentId(0), AgentId(2));

        world.run_system_once(promote_confidants);

        let ties = ties_of(&world, 0);
        assert!(ties.is_confidant(AgentId(1)));
        assert!(!ties.is_confidant(AgentId(2)));
        assert!(ties_of(&world, 1).is_confidant(AgentId(0)));
        assert!(ties_of(&world, 2).confidants().is_empty());
    }
}
