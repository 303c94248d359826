//! Disturbance-following.
//!
//! A measured joint torque whose magnitude strictly exceeds the threshold is
//! read as someone pushing the joint: its target is moved to where the joint
//! is now. No hysteresis and no filtering.

use jointctl_common::controller::config::DisturbanceConfig;

use crate::joint::JointState;

/// Torque threshold detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisturbanceDetector {
    threshold: f64,
}

impl DisturbanceDetector {
    /// Create a detector. `threshold` is expected to be finite and `>= 0`.
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// `|u_measured| > threshold`.
    #[inline]
    pub fn exceeds(&self, u_measured: f64) -> bool {
        u_measured.abs() > self.threshold
    }

    /// Re-target `joint` to its measured angle if its measured torque
    /// exceeds the threshold. Returns whether the target was reassigned.
    #[inline]
    pub fn apply(&self, joint: &mut JointState) -> bool {
        if self.exceeds(joint.u_measured) {
            joint.q_ref = joint.q;
            true
        } else {
            false
        }
    }
}

impl From<&DisturbanceConfig> for DisturbanceDetector {
    fn from(cfg: &DisturbanceConfig) -> Self {
        Self::new(cfg.torque_threshold)
    }
}
