//! Shared snapshot types for the network simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine produces them; loggers and renderers consume them.

pub mod layout;
pub mod snapshot;

pub use layout::{EdgeSnapshot, LayoutSnapshot, NodePosition};
pub use snapshot::{average_belief, AgentRecord, EpochSnapshot, CSV_HEADER};
