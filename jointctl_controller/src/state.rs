//! State machine module root.

pub mod sequencer;
