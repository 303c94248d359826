//! Control laws.
//!
//! PD torque computation and the disturbance threshold detector. Both are
//! pure and evaluated once per joint per tick.

pub mod disturbance;
pub mod pd;
