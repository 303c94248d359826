//! Single-axis joint plant.
//!
//! ```text
//! a = (u_applied - damping * v) / inertia
//! v += a * dt
//! q += v * dt
//! ```
//!
//! `u_applied` is the commanded torque (only in torque mode with I/O
//! enabled) plus any external torque. The torque sensor reports the
//! `u_applied` of the last step.

use jointctl_common::host::ActuationMode;
use tracing::trace;

use crate::config::SimJointConfig;

/// Joint physics simulator.
#[derive(Debug, Clone)]
pub struct JointSimulator {
    name: String,
    q: f64,
    v: f64,
    inertia: f64,
    damping: f64,
    mode: ActuationMode,
    io_enabled: bool,
    /// Torque written by the controller for the coming step.
    u_cmd: f64,
    /// External torque for the coming step.
    u_ext: f64,
    /// Total torque applied on the last step.
    u_applied: f64,
}

impl JointSimulator {
    pub fn new(config: &SimJointConfig) -> Self {
        Self {
            name: config.name.clone(),
            q: config.initial_angle,
            v: 0.0,
            inertia: config.inertia,
            damping: config.damping,
            mode: ActuationMode::Off,
            io_enabled: false,
            u_cmd: 0.0,
            u_ext: 0.0,
            u_applied: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Angle [rad].
    #[inline]
    pub fn angle(&self) -> f64 {
        self.q
    }

    /// Velocity [rad/s].
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.v
    }

    /// Torque sensor reading [N·m].
    #[inline]
    pub fn measured_torque(&self) -> f64 {
        self.u_applied
    }

    #[inline]
    pub fn commanded_torque(&self) -> f64 {
        self.u_cmd
    }

    pub fn mode(&self) -> ActuationMode {
        self.mode
    }

    pub fn io_enabled(&self) -> bool {
        self.io_enabled
    }

    pub fn set_mode(&mut self, mode: ActuationMode) {
        self.mode = mode;
    }

    pub fn enable_io(&mut self) {
        self.io_enabled = true;
    }

    pub fn command_torque(&mut self, torque: f64) {
        self.u_cmd = torque;
    }

    pub fn set_external_torque(&mut self, torque: f64) {
        self.u_ext = torque;
    }

    /// Advance by one timestep.
    pub fn step(&mut self, dt: f64) {
        let commanded = if self.mode == ActuationMode::JointTorque && self.io_enabled {
            self.u_cmd
        } else {
            0.0
        };
        self.u_applied = commanded + self.u_ext;

        let a = (self.u_applied - self.damping * self.v) / self.inertia;
        self.v += a * dt;
        self.q += self.v * dt;

        trace!(joint = %self.name, q = self.q, v = self.v, u = self.u_applied, "joint step");
    }
}
