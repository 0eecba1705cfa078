//! Topology Builder
//!
//! Builds the initial connected graph by preferential attachment, then pairs
//! up dead ends so no agent hangs off the network by a single edge.

use rand::rngs::SmallRng;
use rand::Rng;

use crate::error::SimError;

/// Smallest network the builder accepts is `MIN_AGENTS + 1`
pub const MIN_AGENTS: usize = 5;

/// Undirected graph over agent indices `0..node_count`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    node_count: usize,
    /// Edges in creation order
    edges: Vec<(u32, u32)>,
    adjacency: Vec<Vec<u32>>,
}

impl Topology {
    fn empty(node_count: usize) -> Self {
        Self {
            node_count,
            edges: Vec::new(),
            adjacency: vec![Vec::new(); node_count],
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Edges in the order they were created
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    pub fn degree(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    pub fn neighbours(&self, node: usize) -> &[u32] {
        &self.adjacency[node]
    }

    fn connect(&mut self, a: usize, b: usize) -> bool {
        if a == b || self.adjacency[a].contains(&(b as u32)) {
            return false;
        }
        self.adjacency[a].push(b as u32);
        self.adjacency[b].push(a as u32);
        self.edges.push((a as u32, b as u32));
        true
    }

    /// Whether every node can reach node 0
    pub fn is_connected(&self) -> bool {
        if self.node_count == 0 {
            return true;
        }
        let mut seen = vec![false; self.node_count];
        let mut stack = vec![0usize];
        seen[0] = true;
        while let Some(node) = stack.pop() {
            for &next in &self.adjacency[node] {
                let next = next as usize;
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        seen.into_iter().all(|s| s)
    }
}

/// Build the initial network for `node_count` agents
pub fn build(node_count: usize, rng: &mut SmallRng) -> Result<Topology, SimError> {
    if node_count <= MIN_AGENTS {
        return Err(SimError::InvalidConfiguration(format!(
            "network needs more than {} agents, got {}",
            MIN_AGENTS, node_count
        )));
    }

    let mut topology = Topology::empty(node_count);
    connect_proportionate(&mut topology, rng);
    repair_dead_ends(&mut topology, rng);

    tracing::debug!(
        agents = node_count,
        edges = topology.edges.len(),
        "built initial topology"
    );
    Ok(topology)
}

/// Attach every node after the seed pair to an existing node chosen with
/// probability proportional to its degree.
fn connect_proportionate(topology: &mut Topology, rng: &mut SmallRng) {
    topology.connect(0, 1);
    let mut total_endpoints = 2usize;

    for unconnected in 2..topology.node_count {
        let draw = rng.gen_range(0..total_endpoints);

        // Walk in index order; ties resolve to the earliest node
        let mut cumulative = 0usize;
        let mut selected = 0usize;
        for candidate in 0..topology.node_count {
            cumulative += topology.degree(candidate);
            if draw < cumulative {
                selected = candidate;
                break;
            }
        }

        topology.connect(selected, unconnected);
        total_endpoints += 2;
    }
}

/// Pair up nodes of degree 1 at random until fewer than two remain
fn repair_dead_ends(topology: &mut Topology, rng: &mut SmallRng) {
    let mut dead_ends: Vec<usize> = (0..topology.node_count)
        .filter(|&node| topology.degree(node) == 1)
        .collect();

    while dead_ends.len() >= 2 {
        let first = rng.gen_range(0..dead_ends.len());
        let mut second = rng.gen_range(0..dead_ends.len() - 1);
        if second >= first {
            second += 1;
        }

        topology.connect(dead_ends[first], dead_ends[second]);

        // Remove the higher position first so the lower one stays valid
        let (low, high) = if first < second { (first, second) } else { (second, first) };
        dead_ends.remove(high);
        dead_ends.remove(low);
    }
}
