//! ECS Components
//!
//! Per-agent components and the world-level resources they are indexed by.

pub mod agent;
pub mod body;
pub mod network;
pub mod world;

pub use agent::*;
pub use body::*;
pub use network::*;
pub use world::*;
