//! Host boundary: the runtime that owns joints, buttons and lamps.
//!
//! This module defines:
//! - `Host` trait - Interface the controller drives once per tick
//! - `JointHandle` / `LampHandle` - Typed handles returned by name lookup
//! - `ActuationMode` - Joint command mode
//! - `ButtonSet` - Snapshot of the polled button panel
//! - `HostError` - Device registration failures of a host implementation
//!
//! # Lifecycle
//!
//! 1. Initialization: `find_joint()` / `find_lamp()` resolve every configured
//!    name once; `set_actuation_mode()` + `enable_io()` bind each joint.
//! 2. Every tick: `buttons()`, `joint_angle()`, `joint_torque()`,
//!    `set_joint_torque()`, `set_lamp()` (only on change).
//!
//! Nothing behind this trait may block: the controller calls it from
//! inside the fixed-step tick.

use bitflags::bitflags;
use thiserror::Error;

use crate::consts::MAX_BUTTONS;

/// Typed handle to a joint resolved by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointHandle(pub u16);

/// Typed handle to an on/off indicator device resolved by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LampHandle(pub u16);

/// Joint actuation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ActuationMode {
    /// Joint is passive; commands are ignored.
    #[default]
    Off = 0,
    /// Controller writes torque [N·m].
    JointTorque = 1,
}

bitflags! {
    /// Button panel snapshot, one bit per button index.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ButtonSet: u32 {
        const BUTTON_0 = 1 << 0;
        const BUTTON_1 = 1 << 1;
        const BUTTON_2 = 1 << 2;
        const BUTTON_3 = 1 << 3;
        // Panels may expose up to 32 buttons.
        const _ = !0;
    }
}

impl ButtonSet {
    /// Snapshot with only `index` pressed. Out-of-range indices yield an empty set.
    #[inline]
    pub const fn pressed(index: u8) -> Self {
        if (index as usize) < MAX_BUTTONS {
            Self::from_bits_retain(1 << index)
        } else {
            Self::empty()
        }
    }

    /// Whether button `index` is pressed in this snapshot.
    #[inline]
    pub const fn is_pressed(self, index: u8) -> bool {
        (index as usize) < MAX_BUTTONS && self.bits() & (1 << index) != 0
    }

    /// Indices of all pressed buttons, ascending.
    pub fn pressed_indices(self) -> impl Iterator<Item = u8> {
        (0..MAX_BUTTONS as u8).filter(move |&i| self.is_pressed(i))
    }
}

/// Device registration failures reported by a host implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Two devices of the same kind share a name.
    #[error("duplicate {kind} '{name}'")]
    DuplicateDevice {
        /// Device kind ("joint", "lamp").
        kind: &'static str,
        /// Offending name.
        name: String,
    },

    /// More devices than handles can address.
    #[error("too many {0} devices")]
    TooManyDevices(&'static str),

    /// A device parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Interface between the controller and the runtime hosting it.
///
/// Implemented by the simulated body in `jointctl_sim` and by test mocks.
pub trait Host {
    /// Fixed control timestep [s] as configured on the host.
    fn timestep(&self) -> f64;

    /// Resolve a joint by name.
    fn find_joint(&self, name: &str) -> Option<JointHandle>;

    /// Resolve an indicator lamp by name.
    fn find_lamp(&self, name: &str) -> Option<LampHandle>;

    /// Select the command mode of a joint.
    fn set_actuation_mode(&mut self, joint: JointHandle, mode: ActuationMode);

    /// Enable state input and command output for a joint.
    fn enable_io(&mut self, joint: JointHandle);

    /// Current joint angle [rad].
    fn joint_angle(&self, joint: JointHandle) -> f64;

    /// Torque currently measured at the joint [N·m].
    fn joint_torque(&self, joint: JointHandle) -> f64;

    /// Command a joint torque [N·m] for the coming step.
    fn set_joint_torque(&mut self, joint: JointHandle, torque: f64);

    /// Poll the button panel and return the current snapshot.
    fn buttons(&mut self) -> ButtonSet;

    /// Current on/off state of a lamp.
    fn lamp_is_on(&self, lamp: LampHandle) -> bool;

    /// Switch a lamp and notify its observers of the change.
    fn set_lamp(&mut self, lamp: LampHandle, on: bool);
}
