//! Prelude module for common re-exports.
//!
//! ```rust
//! use jointctl_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::controller::config::{
    ControllerConfig, DisturbanceConfig, GainsConfig, IndicatorConfig, IndicatorGroupConfig,
    JointConfig, LampConfig, SequenceConfig, TriggerConfig,
};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{MAX_BUTTONS, MAX_JOINTS, MAX_LAMPS_PER_GROUP, MAX_TRIGGERS};

// ─── Controller State ───────────────────────────────────────────────
pub use crate::controller::error::InitError;
pub use crate::controller::state::{ControlMode, IndicatorBand, SequencePhase};

// ─── Host Boundary ──────────────────────────────────────────────────
pub use crate::host::{ActuationMode, ButtonSet, Host, HostError, JointHandle, LampHandle};
