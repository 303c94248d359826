//! PD controller with a backward-difference velocity estimate.
//!
//! ```text
//! dq = (q - q_prev) / dt
//! u  = kp * (q_ref - q) + kd * (-dq)
//! ```
//!
//! The derivative acts on the measured velocity, not on the error, so a
//! step in `q_ref` produces no derivative kick. The caller owns `q_prev` and
//! must overwrite it with `q` exactly once per tick, after this call.

use jointctl_common::controller::config::GainsConfig;

/// PD gains of one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdGains {
    /// Proportional gain [N·m/rad].
    pub kp: f64,
    /// Derivative gain [N·m·s/rad].
    pub kd: f64,
}

impl From<GainsConfig> for PdGains {
    fn from(g: GainsConfig) -> Self {
        Self { kp: g.kp, kd: g.kd }
    }
}

/// Backward-difference joint velocity [rad/s].
///
/// `dt` must be finite and `> 0`; `Controller::initialize` rejects any other
/// host timestep.
#[inline]
pub fn velocity_estimate(q: f64, q_prev: f64, dt: f64) -> f64 {
    (q - q_prev) / dt
}

/// Compute the PD torque [N·m] for one tick.
///
/// # Arguments
/// - `gains`: PD gains of the joint.
/// - `q`: Angle measured this tick [rad].
/// - `q_prev`: Angle measured on the previous tick [rad].
/// - `q_ref`: Target angle [rad].
/// - `dt`: Tick period [s].
#[inline]
pub fn pd_compute(gains: &PdGains, q: f64, q_prev: f64, q_ref: f64, dt: f64) -> f64 {
    let dq = velocity_estimate(q, q_prev, dt);
    gains.kp * (q_ref - q) + gains.kd * (-dq)
}

// ─── Tests ──────────────────────────────────────────────────────────
