//! Network Setup
//!
//! Agent spawning, topology construction and initial layout placement.

pub mod agents;
pub mod placement;
pub mod topology;

pub use agents::{build_network, spawn_agent};
pub use placement::place_initial;
pub use topology::Topology;
