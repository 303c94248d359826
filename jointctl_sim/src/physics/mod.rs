//! Physics simulation module.
//!
//! Rigid single-axis joints driven by commanded and external torque.

mod joint;

pub use joint::JointSimulator;
