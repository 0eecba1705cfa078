//! Layout Export Types
//!
//! Positions and edges of the network, for renderers outside the engine.

use serde::{Deserialize, Serialize};

/// Position of one agent in layout space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub belief: f32,
}

/// Undirected edge, stored with `a < b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub a: u32,
    pub b: u32,
}

impl EdgeSnapshot {
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }
}

/// Full layout of the network at a point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub epoch: u64,
    pub nodes: Vec<NodePosition>,
    pub edges: Vec<EdgeSnapshot>,
}

impl LayoutSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Axis-aligned bounds as `(min_x, min_y, max_x, max_y)`
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.nodes.first()?;
        let init = (first.x, first.y, first.x, first.y);
        Some(self.nodes.iter().fold(init, |(x0, y0, x1, y1), n| {
            (x0.min(n.x), y0.min(n.y), x1.max(n.x), y1.max(n.y))
        }))
    }
}
