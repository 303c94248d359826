//! TOML configuration loader with validation.
//!
//! Loads a [`ControllerConfig`] from a file or string, runs the schema
//! validation from `jointctl_common`, then the layout checks that only make
//! sense for a running controller (distinct scripted roles, one lamp group
//! per joint).

use std::collections::HashSet;
use std::path::Path;

use jointctl_common::controller::config::{ControllerConfig, IndicatorConfig, SequenceConfig};

// ─── Error Type ─────────────────────────────────────────────────────

/// Configuration loading/validation error.
#[derive(Debug)]
pub enum ConfigError {
    /// File I/O error.
    IoError(String),
    /// TOML parse error.
    ParseError(String),
    /// Parameter validation error.
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "config I/O error: {e}"),
            Self::ParseError(e) => write!(f, "config parse error: {e}"),
            Self::ValidationError(e) => write!(f, "config validation: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the controller configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::IoError(format!("failed to read {}: {e}", path.display())))?;
    load_config_from_str(&text)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(text: &str) -> Result<ControllerConfig, ConfigError> {
    let config: ControllerConfig = toml::from_str(text)
        .map_err(|e| ConfigError::ParseError(format!("controller config: {e}")))?;
    validate_controller_config(&config)?;
    Ok(config)
}

// ─── Layout Validation ──────────────────────────────────────────────

/// Full validation: schema bounds plus controller layout rules.
pub fn validate_controller_config(config: &ControllerConfig) -> Result<(), ConfigError> {
    config.validate().map_err(ConfigError::ValidationError)?;
    if let Some(ref sequence) = config.sequence {
        validate_sequence_roles(sequence)?;
    }
    if let Some(ref indicators) = config.indicators {
        validate_indicator_groups(indicators)?;
    }
    Ok(())
}

/// The ramp, jump and rotate roles must name three different joints.
fn validate_sequence_roles(sequence: &SequenceConfig) -> Result<(), ConfigError> {
    let roles = [
        sequence.ramp_joint.as_str(),
        sequence.jump_joint.as_str(),
        sequence.rotate_joint.as_str(),
    ];
    let distinct: HashSet<&str> = roles.iter().copied().collect();
    if distinct.len() != roles.len() {
        return Err(ConfigError::ValidationError(format!(
            "sequence roles must use distinct joints, got ramp='{}' jump='{}' rotate='{}'",
            roles[0], roles[1], roles[2]
        )));
    }
    Ok(())
}

/// At most one lamp group per joint.
fn validate_indicator_groups(indicators: &IndicatorConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for group in &indicators.groups {
        if !seen.insert(group.joint.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "joint '{}' has more than one indicator group",
                group.joint
            )));
        }
    }
    Ok(())
}
