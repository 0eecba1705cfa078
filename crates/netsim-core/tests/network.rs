//! Network construction and growth tests

use netsim::components::{AgentId, SocialTies};
use netsim::{SimConfig, SimError, Simulation};

fn simulation(agent_count: usize, seed: u64) -> Simulation {
    let mut config = SimConfig::default();
    config.simulation.agent_count = agent_count;
    config.simulation.seed = seed;
    Simulation::new(config).unwrap()
}

fn is_connected(agent_count: usize, edges: &[(AgentId, AgentId)]) -> bool {
    let mut adjacency = vec![Vec::new(); agent_count];
    for &(a, b) in edges {
        adjacency[a.index()].push(b.index());
        adjacency[b.index()].push(a.index());
    }
    let mut seen = vec![false; agent_count];
    let mut stack = vec![0];
    seen[0] = true;
    while let Some(node) = stack.pop() {
        for &next in &adjacency[node] {
            if !seen[next] {
                seen[next] = true;
                stack.push(next);
            }
        }
    }
    seen.into_iter().all(|s| s)
}

#[test]
fn test_built_network_is_connected_with_at_most_one_dead_end() {
    for seed in 0..10 {
        let sim = simulation(25, seed);
        let snapshot = sim.snapshot();

        assert_eq!(snapshot.len(), 25);
        assert!(is_connected(25, &sim.edges()), "seed {seed} disconnected");

        let dead_ends = snapshot
            .agents
            .iter()
            .filter(|r| r.neighbour_count == 1)
            .count();
        assert!(dead_ends <= 1, "seed {seed} left {dead_ends} dead ends");
    }
}

#[test]
fn test_neighbour_lists_are_symmetric() {
    let sim = simulation(20, 11);
    let mut directed = 0;
    for record in sim.snapshot().agents {
        directed += record.neighbour_count;
    }
    assert_eq!(directed, sim.edges().len() * 2);
}

#[test]
fn test_invalid_agent_counts_rejected() {
    for agent_count in [0, 1, 5] {
        let mut config = SimConfig::default();
        config.simulation.agent_count = agent_count;
        assert!(matches!(
            Simulation::new(config),
            Err(SimError::InvalidConfiguration(_))
        ));
    }
}

#[test]
fn test_growth_adds_one_agent_and_one_edge() {
    let mut sim = simulation(10, 3);
    let edges_before = sim.edges();

    let id = sim.grow_at(4).unwrap();

    assert_eq!(id, AgentId(10));
    assert_eq!(sim.agent_count(), 11);
    let added: Vec<_> = sim
        .edges()
        .into_iter()
        .filter(|e| !edges_before.contains(e))
        .collect();
    assert_eq!(added, vec![(AgentId(4), AgentId(10))]);

    let next = sim.grow_at(10).unwrap();
    assert_eq!(next, AgentId(11));
}

#[test]
fn test_growth_out_of_range() {
    let mut sim = simulation(10, 3);
    assert_eq!(
        sim.grow_at(10),
        Err(SimError::IndexOutOfRange { index: 10, len: 10 })
    );
    assert_eq!(sim.agent_count(), 10);
}

#[test]
fn test_fraternization_respects_connection_limits() {
    let mut sim = simulation(30, 8);
    let initial: Vec<usize> = sim
        .snapshot()
        .agents
        .iter()
        .map(|r| r.neighbour_count)
        .collect();
    let edges_before = sim.edges().len();

    for _ in 0..20 {
        sim.fraternize();
    }

    assert!(sim.edges().len() >= edges_before);
    let world = sim.world_mut();
    let mut query = world.query::<(&AgentId, &SocialTies)>();
    for (id, ties) in query.iter(world) {
        let start = initial[id.index()];
        assert!(
            ties.degree() <= start.max(ties.connection_limit),
            "{id} grew past its limit"
        );
        assert!(ties.neighbours().iter().all(|n| n != id));
    }
}

#[test]
fn test_confidants_are_neighbours() {
    let mut sim = simulation(30, 12);
    sim.fraternize();

    let world = sim.world_mut();
    let mut query = world.query::<&SocialTies>();
    for ties in query.iter(world) {
        assert!(ties.confidants().iter().all(|c| ties.is_neighbour(*c)));
    }
}
