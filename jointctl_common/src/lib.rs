//! jointctl common library
//!
//! Shared constants, configuration loading and the host boundary used by
//! the controller (`jointctl_controller`) and the simulated host
//! (`jointctl_sim`).
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide limits and defaults
//! - [`controller`] - Controller configuration, state enums and init errors
//! - [`host`] - The `Host` trait: typed device handles, joint I/O, buttons, lamps
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use jointctl_common::prelude::*;
//!
//! let buttons = ButtonSet::pressed(3);
//! assert!(buttons.is_pressed(3));
//! ```

pub mod config;
pub mod consts;
pub mod controller;
pub mod host;
pub mod prelude;
