//! Fixed-step run loop, timing statistics and RT setup.
//!
//! One iteration is `controller.tick(body)` followed by `body.step()`. With
//! pacing enabled every iteration is stretched to one wall-clock timestep;
//! otherwise the loop runs as fast as it can.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use jointctl_common::controller::config::ControllerConfig;
use jointctl_common::controller::error::InitError;
use jointctl_common::controller::state::SequencePhase;
use jointctl_common::host::{Host, HostError};
use jointctl_controller::Controller;
use jointctl_controller::config::validate_controller_config;

use crate::body::SimBody;
use crate::config::SimConfig;
use crate::trace::TraceRecorder;

/// Simulation runner error.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("simulated host error: {0}")]
    Host(#[from] HostError),

    #[error("controller initialization failed: {0}")]
    Init(#[from] InitError),

    #[error("RT setup failed: {0}")]
    RtSetup(String),

    #[error("trace output failed: {0}")]
    Trace(#[from] std::io::Error),
}

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Wall-clock cost of loop iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub cycle_count: u64,
    /// [ns]
    pub min_cycle_ns: u64,
    /// [ns]
    pub max_cycle_ns: u64,
    pub sum_cycle_ns: u64,
    /// Iterations longer than one timestep (paced runs only).
    pub overruns: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            min_cycle_ns: u64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
        }
    }

    #[inline]
    pub fn record(&mut self, duration_ns: u64) {
        self.cycle_count += 1;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
    }

    /// Average iteration time [ns] (0 if nothing was recorded).
    #[inline]
    pub fn avg_cycle_ns(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), SimError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| SimError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), SimError> {
    Ok(())
}

/// Touch 256 KiB of stack so the loop does not fault on it later.
#[cfg(feature = "rt")]
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, aligned reference into a live local array.
        unsafe { std::ptr::write_volatile(byte, 0xFF) };
    }
    std::hint::black_box(&buf);
}

#[cfg(not(feature = "rt"))]
fn prefault_stack() {}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), SimError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| SimError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| SimError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), SimError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), SimError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(SimError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), SimError> {
    Ok(())
}

/// Lock memory, prefault the stack, pin to `cpu_core` and switch to
/// SCHED_FIFO at `rt_priority`. A no-op without the `rt` feature.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), SimError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

/// Whether the calling thread runs under a realtime scheduling policy.
pub fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        use libc::{SCHED_FIFO, SCHED_RR, sched_getscheduler};
        // SAFETY: pid 0 queries the calling thread; no pointers involved.
        let policy = unsafe { sched_getscheduler(0) };
        policy == SCHED_FIFO || policy == SCHED_RR
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

// ─── Runner ─────────────────────────────────────────────────────────

/// Outcome of [`SimCore::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    /// Simulated time at the end of the run [s].
    pub sim_time: f64,
    pub final_phase: SequencePhase,
    pub lamp_notifications: u32,
    /// Whether the run was cut short by the running flag.
    pub interrupted: bool,
    pub stats: CycleStats,
}

/// Controller and simulated body driven in lock step.
pub struct SimCore {
    controller: Controller,
    body: SimBody,
    ticks: u64,
    paced: bool,
    trace: Option<TraceRecorder>,
    running: Arc<AtomicBool>,
    stats: CycleStats,
}

impl SimCore {
    /// Validate both configurations, build the body and initialize the
    /// controller against it.
    pub fn new(controller_cfg: &ControllerConfig, sim_cfg: &SimConfig) -> Result<Self, SimError> {
        validate_controller_config(controller_cfg).map_err(|e| SimError::Config(e.to_string()))?;
        sim_cfg
            .validate()
            .map_err(|e| SimError::Config(e.to_string()))?;

        let mut body = SimBody::from_config(sim_cfg)?;
        let controller = Controller::initialize(&mut body, controller_cfg)?;

        info!(
            "SimCore ready: {} body joints, {} lamps, {} ticks of {}s",
            body.joints().len(),
            body.io().lamps().len(),
            sim_cfg.tick_count(),
            sim_cfg.timestep
        );

        Ok(Self {
            controller,
            body,
            ticks: sim_cfg.tick_count(),
            paced: false,
            trace: None,
            running: Arc::new(AtomicBool::new(true)),
            stats: CycleStats::new(),
        })
    }

    /// Pace each iteration to one wall-clock timestep.
    pub fn with_pacing(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Record a trace while running.
    pub fn with_trace(mut self, recorder: TraceRecorder) -> Self {
        self.trace = Some(recorder);
        self
    }

    /// Flag that keeps the loop running; clear it to stop early.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run the configured number of ticks, or until the running flag is
    /// cleared.
    pub fn run(&mut self) -> RunSummary {
        let dt = self.body.timestep();
        let cycle_time = Duration::from_secs_f64(dt);

        info!(
            "Starting simulation ({} ticks, paced={}, rt={})",
            self.ticks,
            self.paced,
            detect_rt_mode()
        );
        let mut tick = 0u64;
        while tick < self.ticks && self.running.load(Ordering::SeqCst) {
            let cycle_start = Instant::now();

            self.controller.tick(&mut self.body);
            if let Some(trace) = self.trace.as_mut() {
                trace.record(tick, self.body.time(), &self.controller);
            }
            self.body.step();
            tick += 1;

            let elapsed = cycle_start.elapsed();
            self.stats.record(elapsed.as_nanos() as u64);

            if self.paced {
                if elapsed > cycle_time {
                    self.stats.overruns += 1;
                    if self.stats.overruns <= 10 || self.stats.overruns % 1000 == 0 {
                        warn!(
                            "Timing violation #{}: tick took {}us (target {}us)",
                            self.stats.overruns,
                            elapsed.as_micros(),
                            cycle_time.as_micros()
                        );
                    }
                } else {
                    std::thread::sleep(cycle_time - elapsed);
                }
            }

            if tick % 1000 == 0 {
                debug!(
                    "t={:.3}s phase={:?} avg={}ns max={}ns",
                    self.body.time(),
                    self.controller.phase(),
                    self.stats.avg_cycle_ns(),
                    self.stats.max_cycle_ns
                );
            }
        }

        let interrupted = tick < self.ticks;

        let summary = RunSummary {
            ticks: tick,
            sim_time: self.body.time(),
            final_phase: self.controller.phase(),
            lamp_notifications: self.body.io().total_notifications(),
            interrupted,
            stats: self.stats,
        };
        info!(
            "Simulation stopped after {} ticks ({:.3}s simulated, {} lamp notifications, interrupted={})",
            summary.ticks, summary.sim_time, summary.lamp_notifications, summary.interrupted
        );
        summary
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn body(&self) -> &SimBody {
        &self.body
    }

    pub fn trace(&self) -> Option<&TraceRecorder> {
        self.trace.as_ref()
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }
}
