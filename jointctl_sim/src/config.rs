//! Simulated host configuration.
//!
//! ```toml
//! timestep = 0.001
//! duration = 12.0
//!
//! [shared]
//! service_name = "autobox_sim"
//!
//! [[joints]]
//! name = "Box"
//! initial_angle = 0.0   # rad
//! inertia = 1.0         # kg·m²
//! damping = 0.0         # N·m·s/rad
//!
//! [[lamps]]
//! name = "GreenLight"
//!
//! [[presses]]
//! button = 3
//! start = 0.5
//! duration = 0.1
//!
//! [[pushes]]
//! joint = "Box"
//! start = 2.0
//! duration = 0.3
//! torque = 0.15
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use jointctl_common::config::{ConfigError, SharedConfig};
use jointctl_common::consts::{MAX_BUTTONS, TIMESTEP_DEFAULT};

/// Complete simulated host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub shared: SharedConfig,

    /// Fixed physics and control timestep [s].
    #[serde(default = "default_timestep")]
    pub timestep: f64,

    /// Simulated run length [s].
    #[serde(default = "default_duration")]
    pub duration: f64,

    pub joints: Vec<SimJointConfig>,

    #[serde(default)]
    pub lamps: Vec<SimLampConfig>,

    /// Scripted button presses.
    #[serde(default)]
    pub presses: Vec<ButtonPressConfig>,

    /// Scheduled external torques.
    #[serde(default)]
    pub pushes: Vec<PushConfig>,
}

fn default_timestep() -> f64 {
    TIMESTEP_DEFAULT
}
fn default_duration() -> f64 {
    10.0
}

/// One simulated joint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimJointConfig {
    pub name: String,
    /// Angle at t = 0 [rad].
    #[serde(default)]
    pub initial_angle: f64,
    /// Rotational inertia [kg·m²].
    #[serde(default = "default_inertia")]
    pub inertia: f64,
    /// Viscous damping [N·m·s/rad].
    #[serde(default)]
    pub damping: f64,
}

fn default_inertia() -> f64 {
    1.0
}

/// One simulated lamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimLampConfig {
    pub name: String,
    #[serde(default)]
    pub initially_on: bool,
}

/// Button held down over `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButtonPressConfig {
    pub button: u8,
    /// [s]
    pub start: f64,
    /// [s]
    pub duration: f64,
}

/// External torque applied to a joint over `[start, start + duration)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    pub joint: String,
    /// [s]
    pub start: f64,
    /// [s]
    pub duration: f64,
    /// [N·m]
    pub torque: f64,
}

impl SimConfig {
    /// Validate parameter bounds and cross-references.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return invalid(format!("timestep {} must be > 0", self.timestep));
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return invalid(format!("duration {} must be >= 0", self.duration));
        }

        let mut joints = HashSet::new();
        for j in &self.joints {
            if !joints.insert(j.name.as_str()) {
                return invalid(format!("duplicate joint '{}'", j.name));
            }
            if !(j.inertia.is_finite() && j.inertia > 0.0) {
                return invalid(format!("joint '{}': inertia must be > 0", j.name));
            }
            if !(j.damping.is_finite() && j.damping >= 0.0) {
                return invalid(format!("joint '{}': damping must be >= 0", j.name));
            }
            if !j.initial_angle.is_finite() {
                return invalid(format!("joint '{}': initial_angle must be finite", j.name));
            }
        }

        let mut lamps = HashSet::new();
        for l in &self.lamps {
            if !lamps.insert(l.name.as_str()) {
                return invalid(format!("duplicate lamp '{}'", l.name));
            }
        }

        for p in &self.presses {
            if p.button as usize >= MAX_BUTTONS {
                return invalid(format!("press button {} out of range", p.button));
            }
            if !(p.start >= 0.0 && p.duration >= 0.0) {
                return invalid(format!("press of button {}: negative time", p.button));
            }
        }

        for p in &self.pushes {
            if !joints.contains(p.joint.as_str()) {
                return invalid(format!("push on unknown joint '{}'", p.joint));
            }
            if !(p.start >= 0.0 && p.duration >= 0.0 && p.torque.is_finite()) {
                return invalid(format!("push on '{}': invalid timing or torque", p.joint));
            }
        }
        Ok(())
    }

    /// Number of ticks covering `duration`.
    pub fn tick_count(&self) -> u64 {
        (self.duration / self.timestep).round() as u64
    }
}
