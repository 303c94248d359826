//! Controller initialization errors.
//!
//! Initialization either succeeds once or the controller is unusable: there
//! are no recoverable errors inside the tick.

use thiserror::Error;

/// Reasons a controller refuses to start.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitError {
    /// Host timestep is zero, negative or not finite.
    #[error("invalid timestep {0}: must be finite and > 0")]
    InvalidTimestep(f64),

    /// One or more configured devices could not be resolved by name.
    #[error("devices not found: joints {joints:?}, lamps {lamps:?}")]
    Unresolved {
        /// Joint names the host did not know.
        joints: Vec<String>,
        /// Lamp names the host did not know.
        lamps: Vec<String>,
    },

    /// Controller configuration rejected by validation.
    #[error("invalid controller configuration: {0}")]
    InvalidConfig(String),
}

impl InitError {
    /// Build an `Unresolved` error, or `None` when nothing is missing.
    pub fn unresolved(joints: Vec<String>, lamps: Vec<String>) -> Option<Self> {
        if joints.is_empty() && lamps.is_empty() {
            None
        } else {
            Some(Self::Unresolved { joints, lamps })
        }
    }
}
