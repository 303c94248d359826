//! Controller shared types.
//!
//! Configuration, state enums and initialization errors used by
//! `jointctl_controller` and by anything that inspects a running controller.

pub mod config;
pub mod error;
pub mod state;
