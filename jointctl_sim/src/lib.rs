//! # jointctl simulated host
//!
//! Stands in for the physics runtime that normally hosts the controller:
//! joints with a second-order plant, a scripted button panel, a lamp bank
//! and scheduled external pushes, all behind the `Host` trait.
//!
//! # Module Structure
//!
//! - [`config`] - Simulated host TOML schema
//! - [`physics`] - Joint plant
//! - [`io`] - Button script and lamp bank
//! - [`body`] - `SimBody`, the `Host` implementation
//! - [`core`] - `SimCore` fixed-step loop, timing statistics, RT setup
//! - [`trace`] - Per-tick sample recording to JSON
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                     SimCore                           │
//! │   ┌──────────────┐  tick(&mut body)  ┌─────────────┐  │
//! │   │  Controller  │──────────────────►│   SimBody   │  │
//! │   │ (controller) │◄──────────────────│   (Host)    │  │
//! │   └──────────────┘  angles, torque,  └──────┬──────┘  │
//! │                     buttons, lamps          │ step(dt)│
//! │                                   ┌─────────┴───────┐ │
//! │                                   │ JointSimulator  │ │
//! │                                   │ IoSimulator     │ │
//! │                                   └─────────────────┘ │
//! └───────────────────────────────────────────────────────┘
//! ```

pub mod body;
pub mod config;
pub mod core;
pub mod io;
pub mod physics;
pub mod trace;

pub use crate::body::SimBody;
pub use crate::core::{SimCore, SimError};
