//! State enums for the controller.
//!
//! All enums use `#[repr(u8)]` so they can be carried as compact integer
//! tags in telemetry. `SequencePhase` keeps the numeric labels of the
//! reference schedule; its execution order is defined by the transition
//! table in `jointctl_controller::state::sequencer`, not by these numbers.

use serde::{Deserialize, Serialize};

/// How targets are produced each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ControlMode {
    /// A triggered multi-phase action drives the targets.
    #[default]
    Scripted = 0,
    /// External torque above a threshold re-targets the joint to where it is.
    Reactive = 1,
}

/// Phase of the scripted action.
///
/// Labels 7 and 8 are executed in the order 8 → 7: the jump joint returns to
/// its initial angle before the rotate joint is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum SequencePhase {
    /// No action in progress.
    #[default]
    Idle = 0,
    /// Ramp joint target moves by `move_distance` every tick.
    Ramp = 1,
    /// Pause after the ramp.
    RampHold = 2,
    /// Jump joint target set to its fixed absolute value.
    Jump = 3,
    /// Pause after the jump.
    JumpHold = 4,
    /// Rotate joint target set to its fixed absolute angle.
    Rotate = 5,
    /// Pause after the rotation.
    RotateHold = 6,
    /// Rotate joint target reset to zero.
    RotateReset = 7,
    /// Jump joint target returned to its initial angle (convergence-gated).
    JumpReturn = 8,
    /// Ramp joint target returned to its initial angle (convergence-gated, terminal).
    RampReturn = 9,
}

impl SequencePhase {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Ramp),
            2 => Some(Self::RampHold),
            3 => Some(Self::Jump),
            4 => Some(Self::JumpHold),
            5 => Some(Self::Rotate),
            6 => Some(Self::RotateHold),
            7 => Some(Self::RotateReset),
            8 => Some(Self::JumpReturn),
            9 => Some(Self::RampReturn),
            _ => None,
        }
    }

    /// Numeric label of the phase.
    #[inline]
    pub const fn label(self) -> u8 {
        self as u8
    }
}

/// Discrete angle band used by indicator lamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum IndicatorBand {
    /// `|angle| < boundary`.
    #[default]
    Within = 0,
    /// `|angle| >= boundary`.
    Beyond = 1,
}

impl IndicatorBand {
    /// Classify an angle [deg] against a band boundary [deg].
    #[inline]
    pub fn classify(angle_deg: f64, boundary_deg: f64) -> Self {
        if angle_deg.abs() >= boundary_deg {
            Self::Beyond
        } else {
            Self::Within
        }
    }
}
