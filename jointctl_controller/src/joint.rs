//! Per-joint runtime state.

use jointctl_common::host::JointHandle;

use crate::control::pd::PdGains;

/// Measured and commanded values of one joint.
///
/// `q_prev` is overwritten with `q` exactly once per tick, after the torque
/// has been computed. `q_initial` is captured at initialization and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct JointState {
    /// Host name of the joint.
    pub name: String,
    /// Handle resolved at initialization.
    pub handle: JointHandle,
    /// PD gains.
    pub gains: PdGains,
    /// Angle measured this tick [rad].
    pub q: f64,
    /// Angle measured on the previous tick [rad].
    pub q_prev: f64,
    /// Target angle [rad].
    pub q_ref: f64,
    /// Angle at initialization [rad].
    pub q_initial: f64,
    /// Torque measured this tick [N·m].
    pub u_measured: f64,
    /// Torque commanded this tick [N·m].
    pub u_cmd: f64,
}

impl JointState {
    /// Seed a joint at rest at angle `q`: target, previous and initial angle
    /// all equal `q`.
    pub fn new(name: impl Into<String>, handle: JointHandle, gains: PdGains, q: f64) -> Self {
        Self {
            name: name.into(),
            handle,
            gains,
            q,
            q_prev: q,
            q_ref: q,
            q_initial: q,
            u_measured: 0.0,
            u_cmd: 0.0,
        }
    }

    /// `q_ref - q` [rad].
    #[inline]
    pub fn tracking_error(&self) -> f64 {
        self.q_ref - self.q
    }
}
