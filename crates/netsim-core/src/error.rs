//! Error Types
//!
//! Failures surfaced by the simulation engine and its configuration loader.

use thiserror::Error;

/// Errors produced by simulation operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Bad agent count or malformed constants. Fatal at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Unrecognized recommendation algorithm name
    #[error("unknown recommendation strategy: {0:?}")]
    UnknownStrategy(String),

    /// Growth or query against an agent that does not exist
    #[error("agent index {index} out of range ({len} live agents)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors produced while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] SimError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SimError::IndexOutOfRange { index: 12, len: 10 };
        assert_eq!(err.to_string(), "agent index 12 out of range (10 live agents)");

        let err = SimError::UnknownStrategy("popular".to_string());
        assert_eq!(err.to_string(), "unknown recommendation strategy: \"popular\"");
    }
}
