//! # jointctl simulator
//!
//! Runs a jointctl controller against the simulated body for a fixed
//! simulated duration. The controller file selects scripted or reactive
//! mode; the sim file describes the joints, lamps, button presses and
//! external pushes.
//!
//! ```text
//! jointctl_sim --controller config/cylinder_lights.toml \
//!              --sim config/cylinder_lights_sim.toml --trace-out trace.json
//! ```

use clap::Parser;
use jointctl_common::config::ConfigLoader;
use jointctl_common::consts::{DEFAULT_CONTROLLER_CONFIG, DEFAULT_SIM_CONFIG};
use jointctl_common::controller::config::ControllerConfig;
use jointctl_controller::config::load_config;
use jointctl_sim::SimCore;
use jointctl_sim::config::SimConfig;
use jointctl_sim::core::rt_setup;
use jointctl_sim::trace::TraceRecorder;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// jointctl simulator: PD joint controller on a simulated body
#[derive(Parser, Debug)]
#[command(name = "jointctl_sim")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Fixed-step simulation of the jointctl joint controller")]
struct Args {
    /// Controller configuration TOML.
    #[arg(long, default_value = DEFAULT_CONTROLLER_CONFIG)]
    controller: PathBuf,

    /// Simulated body configuration TOML.
    #[arg(long, default_value = DEFAULT_SIM_CONFIG)]
    sim: PathBuf,

    /// Override the simulated duration [s].
    #[arg(long)]
    duration: Option<f64>,

    /// Pace the loop to wall-clock time.
    #[arg(long)]
    realtime: bool,

    /// Write a JSON trace of every recorded tick.
    #[arg(long, value_name = "FILE")]
    trace_out: Option<PathBuf>,

    /// Record one trace sample every N ticks.
    #[arg(long, default_value_t = 1)]
    trace_every: u64,

    /// CPU core to pin to for realtime runs (needs the `rt` feature).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority for realtime runs (needs the `rt` feature).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

type BoxError = Box<dyn std::error::Error>;

fn main() {
    let args = Args::parse();

    // Configs are read before the subscriber exists so `[shared] log_level`
    // can seed the filter.
    let configs = load_configs(&args);
    let level = match (&configs, args.verbose) {
        (_, true) => Level::DEBUG,
        (Ok((controller, _)), false) => controller.shared.log_level.as_tracing_level(),
        (Err(_), false) => Level::INFO,
    };
    setup_tracing(level, args.json);

    info!("jointctl simulator v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = configs.and_then(|(controller, sim)| run(&args, &controller, sim));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("jointctl simulator shutdown complete");
}

fn load_configs(args: &Args) -> Result<(ControllerConfig, SimConfig), BoxError> {
    let controller = load_config(&args.controller)?;
    let mut sim = SimConfig::load(&args.sim)?;
    if let Some(duration) = args.duration {
        sim.duration = duration;
    }
    Ok((controller, sim))
}

fn run(args: &Args, controller: &ControllerConfig, sim: SimConfig) -> Result<(), BoxError> {
    info!(
        "Config OK: controller '{}' ({:?}, {} joints), body '{}' ({}s at dt={}s)",
        controller.shared.service_name,
        controller.mode,
        controller.joints.len(),
        sim.shared.service_name,
        sim.duration,
        sim.timestep
    );

    if args.realtime {
        rt_setup(args.cpu_core, args.rt_priority)?;
        info!(
            "RT setup complete (cpu_core={}, priority={})",
            args.cpu_core, args.rt_priority
        );
    }

    let mut core = SimCore::new(controller, &sim)?.with_pacing(args.realtime);
    if args.trace_out.is_some() {
        core = core.with_trace(TraceRecorder::new(args.trace_every));
    }

    let running = core.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    let summary = core.run();
    info!(
        "Run complete: phase={:?}, avg tick={}ns, max tick={}ns, overruns={}",
        summary.final_phase,
        summary.stats.avg_cycle_ns(),
        summary.stats.max_cycle_ns,
        summary.stats.overruns
    );

    if let (Some(path), Some(trace)) = (args.trace_out.as_ref(), core.trace()) {
        trace.write_json(path)?;
        info!("Wrote {} trace samples to {}", trace.len(), path.display());
    }

    Ok(())
}

fn setup_tracing(level: Level, json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
