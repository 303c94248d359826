//! Workspace-wide constants.
//!
//! Single source of truth for capacity limits and default values.
//! Imported by all crates; no duplication permitted.

use static_assertions::const_assert;

/// Maximum number of joints a single controller instance drives.
pub const MAX_JOINTS: usize = 16;

/// Maximum number of lamps in one joint's indicator group.
pub const MAX_LAMPS_PER_GROUP: usize = 4;

/// Maximum number of entries in the trigger menu.
pub const MAX_TRIGGERS: usize = 8;

/// Number of button bits in a [`ButtonSet`](crate::host::ButtonSet) snapshot.
pub const MAX_BUTTONS: usize = 32;

/// Convergence tolerance for convergence-gated phases [rad].
pub const CONVERGENCE_EPSILON_DEFAULT: f64 = 1e-6;

/// Default duration of a time-gated phase [s].
pub const HOLD_DURATION_DEFAULT: f64 = 1.0;

/// Default absolute target of the jump phase [rad].
pub const JUMP_TARGET_DEFAULT: f64 = 0.005;

/// Default absolute target of the rotate phase [deg].
pub const ROTATE_TARGET_DEG_DEFAULT: f64 = 45.0;

/// Default disturbance torque threshold [N·m].
pub const TORQUE_THRESHOLD_DEFAULT: f64 = 0.1;

/// Default indicator band boundary [deg].
pub const BAND_BOUNDARY_DEG_DEFAULT: f64 = 35.0;

/// Default simulation timestep [s] (1 kHz).
pub const TIMESTEP_DEFAULT: f64 = 0.001;

/// Default controller configuration path.
pub const DEFAULT_CONTROLLER_CONFIG: &str = "config/autobox.toml";

/// Default simulated host configuration path.
pub const DEFAULT_SIM_CONFIG: &str = "config/autobox_sim.toml";

// ButtonSet is a u32 bit set.
const_assert!(MAX_BUTTONS <= 32);
// Lamp changes per tick are collected in a fixed-capacity buffer.
const_assert!(MAX_LAMPS_PER_GROUP * MAX_JOINTS <= 64);
