//! # jointctl controller
//!
//! Drives a small set of torque-commanded joints toward target angles with a
//! discrete-time PD law, one tick per fixed host timestep. Targets come from
//! one of two sources:
//!
//! 1. **Scripted**: a button-triggered, multi-phase action advanced by
//!    elapsed time and convergence conditions ([`state::sequencer`]).
//! 2. **Reactive**: external torque above a threshold re-targets a joint to
//!    wherever it currently is ([`control::disturbance`]).
//!
//! Optionally each joint's angle is mapped into a band and mirrored on a
//! group of on/off lamps, switched only on change ([`indicator`]).
//!
//! ## Tick Order
//!
//! buttons → sequencer or disturbance → PD per joint → torque out →
//! `q_prev` commit → indicators.
//!
//! ## Zero-Allocation Tick
//!
//! Joint state, lamp groups and the trigger menu live in fixed-capacity
//! `heapless` collections filled once by [`cycle::Controller::initialize`].

pub mod config;
pub mod control;
pub mod cycle;
pub mod indicator;
pub mod joint;
pub mod state;

pub use cycle::Controller;
