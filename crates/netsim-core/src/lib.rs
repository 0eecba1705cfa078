//! Belief-Spread Network Simulator Library
//!
//! Grows a social network, spreads opinions across it one epoch at a time,
//! and relaxes a force-directed layout of the graph for display.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod output;
pub mod runner;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::{AgentId, AgentIndex, Belief, Body, Dissonance, MessageStats, SocialTies};
pub use config::{SimConfig, DEFAULT_CONFIG_PATH};
pub use error::{ConfigError, SimError};
pub use output::{CsvLogger, EpochSink, LoggerError};
pub use runner::{PhysicsLoop, SharedSimulation};
pub use simulation::Simulation;

pub use netsim_events::{EpochSnapshot, LayoutSnapshot};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
