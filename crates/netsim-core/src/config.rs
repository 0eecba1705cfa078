//! Configuration System
//!
//! Loads tuning parameters from a TOML file. Every section falls back to its
//! defaults, so a file only needs to name the values it changes. The config is
//! fixed once a simulation has been constructed.

use bevy_ecs::prelude::*;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, SimError};

/// Default tuning file path
pub const DEFAULT_CONFIG_PATH: &str = "netsim.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub agents: AgentConfig,
    #[serde(default)]
    pub influence: InfluenceConfig,
    #[serde(default)]
    pub social: SocialConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Run-level parameters
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Agents created by the topology builder (must exceed 5)
    pub agent_count: usize,
    /// Seed for the single generator shared by every random draw
    pub seed: u64,
    /// Layout ticks per second while physics is enabled
    pub tick_rate_hz: u32,
    /// Epochs run by the headless binary
    pub epochs: u64,
    /// Delay between epochs in the headless binary
    pub epoch_interval_ms: u64,
    /// Run a fraternization pass every N epochs (0 disables)
    pub fraternize_every: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agent_count: 50,
            seed: 0,
            tick_rate_hz: 30,
            epochs: 100,
            epoch_interval_ms: 100,
            fraternize_every: 10,
        }
    }
}

/// Per-agent initial state and dissonance policy
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub threshold_min: f32,
    pub threshold_max: f32,
    pub connection_limit_min: usize,
    pub connection_limit_max: usize,
    /// Amount subtracted from every agent's dissonance each epoch
    pub dissonance_decay: f32,
    /// Dissonance never drops below this value
    pub dissonance_floor: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            threshold_min: 0.5,
            threshold_max: 1.5,
            connection_limit_min: 3,
            connection_limit_max: 8,
            dissonance_decay: 0.1,
            dissonance_floor: 0.0,
        }
    }
}

/// Message delivery and belief influence
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceConfig {
    /// Senders recommended to each agent per epoch
    pub recommendation_size: usize,
    /// Recommendation algorithm name
    pub strategy: String,
    /// Share of the belief gap adopted from a confidant
    pub confidant_weight: f32,
    /// Share of the belief gap adopted from anyone else
    pub stranger_weight: f32,
    /// Dissonance added per unit of weighted belief gap
    pub dissonance_gain: f32,
    /// Share of the weighted gap a rejected message pushes belief away
    pub backfire: f32,
    /// Multiplier applied to dissonance when a conflict occurs
    pub conflict_relief: f32,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            recommendation_size: 5,
            strategy: "random".to_string(),
            confidant_weight: 0.3,
            stranger_weight: 0.1,
            dissonance_gain: 0.5,
            backfire: 0.05,
            conflict_relief: 0.5,
        }
    }
}

/// Social growth
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Chance that an agent below its limit proposes an edge in a pass
    pub fraternize_chance: f64,
    /// Neighbours within this belief distance become confidants
    pub confidant_affinity: f32,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            fraternize_chance: 0.2,
            confidant_affinity: 0.25,
        }
    }
}

/// Force-directed layout constants.
///
/// Stable behaviour needs `push_range < spring_length`. This is not enforced;
/// a config violating it only logs a warning.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Where the anchor agent is pinned by initial placement
    pub origin: DVec2,
    /// Radial distance between a placed agent and its parent
    pub link_distance: f64,
    /// Upper bound of the per-axis placement jitter
    pub jitter: f64,
    pub push_range: f64,
    pub push_constant: f64,
    pub spring_length: f64,
    pub spring_constant: f64,
    pub damping: f64,
    pub centering_enabled: bool,
    pub center: DVec2,
    pub center_strength: f64,
    /// Offset from the parent at which a grown agent appears
    pub growth_offset: DVec2,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin: DVec2::new(400.0, 400.0),
            link_distance: 150.0,
            jitter: 10.0,
            push_range: 90.0,
            push_constant: 0.1,
            spring_length: 110.0,
            spring_constant: 0.005,
            damping: 0.5,
            centering_enabled: false,
            center: DVec2::new(512.0, 384.0),
            center_strength: 0.25,
            growth_offset: DVec2::new(150.0, 150.0),
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every constant the engine depends on
    pub fn validate(&self) -> Result<(), SimError> {
        let sim = &self.simulation;
        if sim.agent_count <= 5 {
            return Err(invalid(format!(
                "agent_count must be greater than 5, got {}",
                sim.agent_count
            )));
        }
        if sim.tick_rate_hz == 0 {
            return Err(invalid("tick_rate_hz must be positive"));
        }

        let agents = &self.agents;
        non_negative("threshold_min", agents.threshold_min as f64)?;
        non_negative("threshold_max", agents.threshold_max as f64)?;
        if agents.threshold_min > agents.threshold_max {
            return Err(invalid("threshold_min exceeds threshold_max"));
        }
        if agents.connection_limit_min > agents.connection_limit_max {
            return Err(invalid("connection_limit_min exceeds connection_limit_max"));
        }
        non_negative("dissonance_decay", agents.dissonance_decay as f64)?;
        finite("dissonance_floor", agents.dissonance_floor as f64)?;

        let influence = &self.influence;
        unit_interval("confidant_weight", influence.confidant_weight as f64)?;
        unit_interval("stranger_weight", influence.stranger_weight as f64)?;
        unit_interval("backfire", influence.backfire as f64)?;
        unit_interval("conflict_relief", influence.conflict_relief as f64)?;
        non_negative("dissonance_gain", influence.dissonance_gain as f64)?;

        unit_interval("fraternize_chance", self.social.fraternize_chance)?;
        non_negative("confidant_affinity", self.social.confidant_affinity as f64)?;

        let layout = &self.layout;
        if !layout.origin.is_finite() || !layout.center.is_finite() || !layout.growth_offset.is_finite() {
            return Err(invalid("layout coordinates must be finite"));
        }
        non_negative("link_distance", layout.link_distance)?;
        non_negative("jitter", layout.jitter)?;
        non_negative("push_range", layout.push_range)?;
        non_negative("push_constant", layout.push_constant)?;
        non_negative("spring_length", layout.spring_length)?;
        non_negative("spring_constant", layout.spring_constant)?;
        non_negative("center_strength", layout.center_strength)?;
        if !(layout.damping > 0.0 && layout.damping <= 1.0) {
            return Err(invalid(format!(
                "damping must be in (0, 1], got {}",
                layout.damping
            )));
        }

        if layout.push_range >= layout.spring_length {
            tracing::warn!(
                push_range = layout.push_range,
                spring_length = layout.spring_length,
                "push_range should be below spring_length; the layout may not settle"
            );
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SimError {
    SimError::InvalidConfiguration(message.into())
}

fn finite(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be finite, got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), SimError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(invalid(format!("{name} must not be negative, got {value}")));
    }
    Ok(())
}

fn unit_interval(name: &str, value: f64) -> Result<(), SimError> {
    non_negative(name, value)?;
    if value > 1.0 {
        return Err(invalid(format!("{name} must be at most 1, got {value}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.agent_count, 50);
        assert_eq!(config.influence.recommendation_size, 5);
        assert!(config.layout.push_range < config.layout.spring_length);
    }

    #[test]
    fn test_rejects_small_networks() {
        let mut config = SimConfig::default();
        config.simulation.agent_count = 5;
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfiguration(_))
        ));

        config.simulation.agent_count = 6;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_constants() {
        let mut config = SimConfig::default();
        config.layout.damping = 1.5;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.layout.spring_constant = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.agents.threshold_min = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [simulation]
            agent_count = 12
            seed = 7

            [layout]
            centering_enabled = true
            origin = [0.0, 0.0]
        "#;
        let config = SimConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.simulation.agent_count, 12);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.tick_rate_hz, 30);
        assert!(config.layout.centering_enabled);
        assert_eq!(config.layout.origin, DVec2::ZERO);
        assert_eq!(config.influence.strategy, "random");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = SimConfig::from_toml_str("[simulation]\nagent_count = 3\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = SimConfig::from_toml_str("[simulation\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
