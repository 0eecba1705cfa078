//! Epoch Snapshots
//!
//! One row per live agent, captured after an opinion epoch has completed.

use serde::{Deserialize, Serialize};

/// Column header written at the top of every CSV logging session.
pub const CSV_HEADER: &str = "epoch,nodeID,belief,disLeftToThreshold,dissonance,numNeighbours,\
avgNeighbourBelief,numConfidants,avgConfidantBelief,numberOfContacts,numberOfConflicts";

/// Public state of a single agent at the end of an epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub epoch: u64,
    pub id: u32,
    pub belief: f32,
    /// `dissonance_threshold - current_dissonance`
    pub threshold_margin: f32,
    pub current_dissonance: f32,
    pub neighbour_count: usize,
    pub avg_neighbour_belief: f32,
    pub confidant_count: usize,
    pub avg_confidant_belief: f32,
    pub contact_count: u64,
    pub conflict_count: u64,
}

impl AgentRecord {
    /// Render this record as one CSV line (no trailing newline)
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{}",
            self.epoch,
            self.id,
            self.belief,
            self.threshold_margin,
            self.current_dissonance,
            self.neighbour_count,
            self.avg_neighbour_belief,
            self.confidant_count,
            self.avg_confidant_belief,
            self.contact_count,
            self.conflict_count,
        )
    }
}

/// Every agent's record for one completed epoch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochSnapshot {
    pub epoch: u64,
    pub agents: Vec<AgentRecord>,
}

impl EpochSnapshot {
    pub fn new(epoch: u64) -> Self {
        Self {
            epoch,
            agents: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&AgentRecord> {
        self.agents.iter().find(|r| r.id == id)
    }

    /// Mean belief across all agents, 0.0 for an empty snapshot
    pub fn mean_belief(&self) -> f32 {
        average_belief(self.agents.iter().map(|r| r.belief))
    }

    pub fn total_conflicts(&self) -> u64 {
        self.agents.iter().map(|r| r.conflict_count).sum()
    }
}

/// Average of a set of beliefs. An empty set averages to 0.0.
pub fn average_belief(beliefs: impl IntoIterator<Item = f32>) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for belief in beliefs {
        sum += belief;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, belief: f32) -> AgentRecord {
        AgentRecord {
            epoch: 3,
            id,
            belief,
            threshold_margin: 0.75,
            current_dissonance: 0.25,
            neighbour_count: 2,
            avg_neighbour_belief: 0.5,
            confidant_count: 0,
            avg_confidant_belief: 0.0,
            contact_count: 10,
            conflict_count: 1,
        }
    }

    #[test]
    fn test_average_of_empty_set_is_zero() {
        assert_eq!(average_belief(Vec::<f32>::new()), 0.0);
    }

    #[test]
    fn test_average_belief() {
        let avg = average_belief([0.5, -0.5, 1.0]);
        assert!((avg - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_csv_row_matches_header_width() {
        let row = record(7, 0.5).to_csv_row();
        assert_eq!(row, "3,7,0.5,0.75,0.25,2,0.5,0,0,10,1");
        assert_eq!(
            row.split(',').count(),
            CSV_HEADER.split(',').count()
        );
    }

    #[test]
    fn test_snapshot_lookup_and_totals() {
        let mut snapshot = EpochSnapshot::new(3);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.mean_belief(), 0.0);

        snapshot.agents.push(record(0, 0.2));
        snapshot.agents.push(record(1, 0.4));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(1).map(|r| r.belief), Some(0.4));
        assert!(snapshot.get(9).is_none());
        assert_eq!(snapshot.total_conflicts(), 2);
        assert!((snapshot.mean_belief() - 0.3).abs() < 1e-6);
    }
}
