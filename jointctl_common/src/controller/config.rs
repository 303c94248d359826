//! Configuration structures for the controller.
//!
//! All config types use `serde::Deserialize` for TOML loading.
//! Optional fields use `#[serde(default)]` so minimal files stay minimal.
//! Gains are per controller instance and immutable once loaded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::SharedConfig;
use crate::consts::{
    BAND_BOUNDARY_DEG_DEFAULT, CONVERGENCE_EPSILON_DEFAULT, HOLD_DURATION_DEFAULT,
    JUMP_TARGET_DEFAULT, MAX_BUTTONS, MAX_JOINTS, MAX_LAMPS_PER_GROUP, MAX_TRIGGERS,
    ROTATE_TARGET_DEG_DEFAULT, TORQUE_THRESHOLD_DEFAULT,
};

use super::state::{ControlMode, IndicatorBand};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Service name and log level.
    pub shared: SharedConfig,

    /// Target source: scripted sequence or disturbance following.
    #[serde(default)]
    pub mode: ControlMode,

    /// Default PD gains for every joint.
    pub gains: GainsConfig,

    /// Joints driven by this controller, in tick order.
    pub joints: Vec<JointConfig>,

    /// Scripted action parameters (required in scripted mode).
    #[serde(default)]
    pub sequence: Option<SequenceConfig>,

    /// Disturbance detector parameters (required in reactive mode).
    #[serde(default)]
    pub disturbance: Option<DisturbanceConfig>,

    /// Indicator lamps (optional in either mode).
    #[serde(default)]
    pub indicators: Option<IndicatorConfig>,
}

impl ControllerConfig {
    /// Validate parameter bounds and cross-references.
    pub fn validate(&self) -> Result<(), String> {
        self.shared.validate().map_err(|e| e.to_string())?;
        self.gains.validate("gains")?;

        if self.joints.is_empty() {
            return Err("at least one joint is required".to_string());
        }
        if self.joints.len() > MAX_JOINTS {
            return Err(format!(
                "{} joints configured, at most {} supported",
                self.joints.len(),
                MAX_JOINTS
            ));
        }
        let mut names = HashSet::new();
        for joint in &self.joints {
            if joint.name.trim().is_empty() {
                return Err("joint name cannot be empty".to_string());
            }
            if !names.insert(joint.name.as_str()) {
                return Err(format!("duplicate joint '{}'", joint.name));
            }
            joint
                .gains(&self.gains)
                .validate(&format!("joint '{}'", joint.name))?;
        }

        match self.mode {
            ControlMode::Scripted => {
                let sequence = self
                    .sequence
                    .as_ref()
                    .ok_or("scripted mode requires a [sequence] section")?;
                sequence.validate(&names)?;
            }
            ControlMode::Reactive => {
                let disturbance = self
                    .disturbance
                    .as_ref()
                    .ok_or("reactive mode requires a [disturbance] section")?;
                disturbance.validate()?;
            }
        }

        if let Some(ref indicators) = self.indicators {
            indicators.validate(&names)?;
        }
        Ok(())
    }

    /// Position of a joint in `joints`.
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }
}

// ─── Gains ──────────────────────────────────────────────────────────

/// PD gain pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainsConfig {
    /// Proportional gain [N·m/rad].
    pub kp: f64,
    /// Derivative gain [N·m·s/rad].
    pub kd: f64,
}

impl GainsConfig {
    fn validate(&self, what: &str) -> Result<(), String> {
        if !self.kp.is_finite() || self.kp < 0.0 {
            return Err(format!("{what}: kp {} must be finite and >= 0", self.kp));
        }
        if !self.kd.is_finite() || self.kd < 0.0 {
            return Err(format!("{what}: kd {} must be finite and >= 0", self.kd));
        }
        Ok(())
    }
}

/// One joint binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointConfig {
    /// Host name of the joint.
    pub name: String,
    /// Proportional gain override.
    #[serde(default)]
    pub kp: Option<f64>,
    /// Derivative gain override.
    #[serde(default)]
    pub kd: Option<f64>,
}

impl JointConfig {
    /// Effective gains: per-joint overrides on top of the defaults.
    pub fn gains(&self, defaults: &GainsConfig) -> GainsConfig {
        GainsConfig {
            kp: self.kp.unwrap_or(defaults.kp),
            kd: self.kd.unwrap_or(defaults.kd),
        }
    }
}

// ─── Sequence ───────────────────────────────────────────────────────

/// Scripted action parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Joint whose target is ramped, then returned to its initial angle.
    pub ramp_joint: String,
    /// Joint whose target jumps to `jump_target`, then returns.
    pub jump_joint: String,
    /// Joint rotated to `rotate_target_deg`, then reset to zero.
    pub rotate_joint: String,

    /// Absolute jump target [rad].
    #[serde(default = "default_jump_target")]
    pub jump_target: f64,

    /// Absolute rotate target [deg].
    #[serde(default = "default_rotate_target_deg")]
    pub rotate_target_deg: f64,

    /// Duration of every time-gated phase [s].
    #[serde(default = "default_hold_duration")]
    pub hold_duration: f64,

    /// Tolerance of convergence-gated phases [rad].
    #[serde(default = "default_convergence_epsilon")]
    pub convergence_epsilon: f64,

    /// Trigger menu, checked in order.
    pub triggers: Vec<TriggerConfig>,
}

fn default_jump_target() -> f64 {
    JUMP_TARGET_DEFAULT
}
fn default_rotate_target_deg() -> f64 {
    ROTATE_TARGET_DEG_DEFAULT
}
fn default_hold_duration() -> f64 {
    HOLD_DURATION_DEFAULT
}
fn default_convergence_epsilon() -> f64 {
    CONVERGENCE_EPSILON_DEFAULT
}

impl SequenceConfig {
    fn validate(&self, joints: &HashSet<&str>) -> Result<(), String> {
        for (role, name) in [
            ("ramp_joint", &self.ramp_joint),
            ("jump_joint", &self.jump_joint),
            ("rotate_joint", &self.rotate_joint),
        ] {
            if !joints.contains(name.as_str()) {
                return Err(format!("sequence.{role} '{name}' is not a configured joint"));
            }
        }
        if !self.jump_target.is_finite() || !self.rotate_target_deg.is_finite() {
            return Err("sequence targets must be finite".to_string());
        }
        if !(self.hold_duration.is_finite() && self.hold_duration > 0.0) {
            return Err(format!(
                "sequence.hold_duration {} must be > 0",
                self.hold_duration
            ));
        }
        if !(self.convergence_epsilon.is_finite() && self.convergence_epsilon > 0.0) {
            return Err(format!(
                "sequence.convergence_epsilon {} must be > 0",
                self.convergence_epsilon
            ));
        }
        if self.triggers.is_empty() {
            return Err("sequence.triggers cannot be empty".to_string());
        }
        if self.triggers.len() > MAX_TRIGGERS {
            return Err(format!(
                "{} triggers configured, at most {} supported",
                self.triggers.len(),
                MAX_TRIGGERS
            ));
        }
        for trigger in &self.triggers {
            if trigger.button as usize >= MAX_BUTTONS {
                return Err(format!(
                    "trigger button {} out of range [0, {})",
                    trigger.button, MAX_BUTTONS
                ));
            }
            if !trigger.move_distance.is_finite() {
                return Err(format!(
                    "trigger button {}: move_distance must be finite",
                    trigger.button
                ));
            }
        }
        Ok(())
    }
}

/// One entry of the trigger menu.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Button index on the host panel.
    pub button: u8,
    /// Per-tick ramp increment selected by this button [rad].
    pub move_distance: f64,
}

// ─── Disturbance ────────────────────────────────────────────────────

/// Disturbance-following parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceConfig {
    /// Measured torque magnitude above which the joint is re-targeted [N·m].
    #[serde(default = "default_torque_threshold")]
    pub torque_threshold: f64,
}

fn default_torque_threshold() -> f64 {
    TORQUE_THRESHOLD_DEFAULT
}

impl Default for DisturbanceConfig {
    fn default() -> Self {
        Self {
            torque_threshold: TORQUE_THRESHOLD_DEFAULT,
        }
    }
}

impl DisturbanceConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.torque_threshold.is_finite() || self.torque_threshold < 0.0 {
            return Err(format!(
                "disturbance.torque_threshold {} must be finite and >= 0",
                self.torque_threshold
            ));
        }
        Ok(())
    }
}

// ─── Indicators ─────────────────────────────────────────────────────

/// Indicator lamp layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// Band boundary [deg].
    #[serde(default = "default_boundary_deg")]
    pub boundary_deg: f64,
    /// One lamp group per observed joint.
    pub groups: Vec<IndicatorGroupConfig>,
}

fn default_boundary_deg() -> f64 {
    BAND_BOUNDARY_DEG_DEFAULT
}

impl IndicatorConfig {
    fn validate(&self, joints: &HashSet<&str>) -> Result<(), String> {
        if !(self.boundary_deg.is_finite() && self.boundary_deg > 0.0) {
            return Err(format!(
                "indicators.boundary_deg {} must be > 0",
                self.boundary_deg
            ));
        }
        let mut lamps = HashSet::new();
        for group in &self.groups {
            if !joints.contains(group.joint.as_str()) {
                return Err(format!(
                    "indicator group joint '{}' is not a configured joint",
                    group.joint
                ));
            }
            if group.lamps.is_empty() || group.lamps.len() > MAX_LAMPS_PER_GROUP {
                return Err(format!(
                    "indicator group '{}' needs 1..={} lamps, has {}",
                    group.joint,
                    MAX_LAMPS_PER_GROUP,
                    group.lamps.len()
                ));
            }
            for lamp in &group.lamps {
                if !lamps.insert(lamp.name.as_str()) {
                    return Err(format!("lamp '{}' assigned twice", lamp.name));
                }
            }
        }
        Ok(())
    }
}

/// Lamps attached to one joint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorGroupConfig {
    /// Observed joint.
    pub joint: String,
    /// Lamps of the group.
    pub lamps: Vec<LampConfig>,
}

/// One lamp and the bands in which it is lit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LampConfig {
    /// Host name of the lamp device.
    pub name: String,
    /// Bands in which the lamp is on; empty means always driven off.
    #[serde(default)]
    pub lit_in: Vec<IndicatorBand>,
}
