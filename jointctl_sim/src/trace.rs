//! Per-tick trace recording.
//!
//! Samples are taken after each controller tick, before the body advances,
//! so `q` is the angle the controller acted on and `u_cmd` the torque it
//! wrote for the coming step.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use jointctl_controller::Controller;

/// One joint in one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSample {
    pub name: String,
    pub q: f64,
    pub q_ref: f64,
    pub u_cmd: f64,
}

/// Controller snapshot at time `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    pub t: f64,
    /// Sequence phase label (0 when idle or reactive).
    pub phase: u8,
    pub joints: Vec<JointSample>,
}

/// Recorded run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceRecorder {
    /// Keep every `decimation`-th tick.
    decimation: u64,
    samples: Vec<TraceSample>,
}

impl TraceRecorder {
    pub fn new(decimation: u64) -> Self {
        Self {
            decimation: decimation.max(1),
            samples: Vec::new(),
        }
    }

    /// Record the controller state after tick number `tick` at time `t`.
    pub fn record(&mut self, tick: u64, t: f64, controller: &Controller) {
        if tick % self.decimation != 0 {
            return;
        }
        self.samples.push(TraceSample {
            t,
            phase: controller.phase().label(),
            joints: controller
                .joints()
                .iter()
                .map(|j| JointSample {
                    name: j.name.clone(),
                    q: j.q,
                    q_ref: j.q_ref,
                    u_cmd: j.u_cmd,
                })
                .collect(),
        });
    }

    pub fn samples(&self) -> &[TraceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Write the samples as a JSON array.
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut out, &self.samples)?;
        out.flush()
    }
}
