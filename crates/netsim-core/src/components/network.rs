//! Network Components
//!
//! Social edges between agents and the registry that maps ids to entities.

use bevy_ecs::prelude::*;

use super::agent::AgentId;

/// Direct social ties of an agent.
///
/// Edges are symmetric: every id in `neighbours` also lists this agent.
/// `neighbours` keeps insertion order, which initial placement relies on.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct SocialTies {
    neighbours: Vec<AgentId>,
    confidants: Vec<AgentId>,
    /// Maximum neighbour count, enforced only by fraternization
    pub connection_limit: usize,
}

impl SocialTies {
    pub fn new(connection_limit: usize) -> Self {
        Self {
            neighbours: Vec::new(),
            confidants: Vec::new(),
            connection_limit,
        }
    }

    pub fn neighbours(&self) -> &[AgentId] {
        &self.neighbours
    }

    pub fn confidants(&self) -> &[AgentId] {
        &self.confidants
    }

    pub fn degree(&self) -> usize {
        self.neighbours.len()
    }

    pub fn is_neighbour(&self, id: AgentId) -> bool {
        self.neighbours.contains(&id)
    }

    pub fn is_confidant(&self, id: AgentId) -> bool {
        self.confidants.contains(&id)
    }

    pub fn below_limit(&self) -> bool {
        self.neighbours.len() < self.connection_limit
    }

    /// Record one side of an edge. Returns false if it already existed.
    pub fn add_neighbour(&mut self, id: AgentId) -> bool {
        if self.is_neighbour(id) {
            return false;
        }
        self.neighbours.push(id);
        true
    }

    /// Promote a neighbour to confidant. Non-neighbours are ignored.
    pub fn add_confidant(&mut self, id: AgentId) -> bool {
        if !self.is_neighbour(id) || self.is_confidant(id) {
            return false;
        }
        self.confidants.push(id);
        true
    }
}

/// Resource: registry of live agents.
///
/// Ids are dense and never reused, so an agent's id doubles as its index.
#[derive(Resource, Debug, Default)]
pub struct AgentIndex {
    entities: Vec<Entity>,
}

impl AgentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next registered agent will receive
    pub fn next_id(&self) -> AgentId {
        AgentId(self.entities.len() as u32)
    }

    /// Register a freshly spawned agent under the next free id
    pub fn register(&mut self, entity: Entity) -> AgentId {
        let id = self.next_id();
        self.entities.push(entity);
        id
    }

    pub fn entity(&self, id: AgentId) -> Option<Entity> {
        self.entities.get(id.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All ids in creation order
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.entities.len() as u32).map(AgentId)
    }

    /// `(id, entity)` pairs in creation order
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, Entity)> + '_ {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (AgentId(i as u32), *e))
    }
}

/// Connect two agents on both sides. Returns false for self-loops,
/// unknown ids, or an edge that already exists.
pub fn link_agents(world: &mut World, a: AgentId, b: AgentId) -> bool {
    if a == b {
        return false;
    }
    let (entity_a, entity_b) = {
        let index = world.resource::<AgentIndex>();
        match (index.entity(a), index.entity(b)) {
            (Some(ea), Some(eb)) => (ea, eb),
            _ => return false,
        }
    };

    let added = match world.get_mut::<SocialTies>(entity_a) {
        Some(mut ties) => ties.add_neighbour(b),
        None => return false,
    };
    if let Some(mut ties) = world.get_mut::<SocialTies>(entity_b) {
        ties.add_neighbour(a);
    }
    added
}
