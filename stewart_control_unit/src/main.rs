//! # Stewart Control Unit
//!
//! Fixed-rate controller for a Stewart motion platform.
//!
//! Loads `platform.toml`, creates the actuator driver, telemetry client and
//! temperature source it names, performs RT setup, and runs the control loop
//! until `quit`/`exit` arrives from telemetry, a signal is received, or the
//! optional frame limit is reached.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::Ordering;
use stewart_common::consts::DEFAULT_CONFIG_PATH;
use stewart_common::platform::config::PlatformConfig;
use stewart_control_unit::config::load_config;
use stewart_control_unit::context::PlatformContext;
use stewart_control_unit::cycle::{rt_setup, CycleRunner};
use stewart_hal::DriverRegistry;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Stewart Control Unit: Motion platform control loop
#[derive(Parser, Debug)]
#[command(name = "stewart_control_unit")]
#[command(version)]
#[command(about = "Fixed-rate pose-to-actuator control loop for Stewart motion platforms")]
struct Args {
    /// Path to the platform configuration TOML.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Stop after this many frames (0 = run until quit/exit or signal).
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// CPU core to pin the RT thread to (default: 1).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (default: 80).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // The config log level feeds the filter, so load before tracing is up.
    let config = load_config(&args.config);
    setup_tracing(&args, config.as_ref().ok());

    info!("Stewart Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, &config))
    {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Stewart Control Unit shutdown complete");
}

fn run(args: &Args, config: &PlatformConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Config OK ({}): {} Hz, driver '{}', telemetry '{}'",
        args.config.display(),
        config.control_loop.frame_rate_hz,
        config.driver.name,
        config.telemetry.kind
    );

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    let registry = DriverRegistry::with_builtin();
    let ctx = PlatformContext::from_config(config, &registry)?;
    info!("Platform '{}' ready", ctx.platform_name());

    // Signal handler clears the same flag quit/exit clear.
    let active = ctx.active_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        active.store(false, Ordering::SeqCst);
    })?;

    let max_frames = (args.frames > 0).then_some(args.frames);
    let mut runner = CycleRunner::new(ctx, max_frames);
    runner.run()?;

    Ok(())
}

/// Setup tracing subscriber from CLI arguments and the config log level.
fn setup_tracing(args: &Args, config: Option<&PlatformConfig>) {
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        let directive = config.map_or("info", |c| c.shared.log_level.as_directive());
        match directive.parse() {
            Ok(d) => EnvFilter::from_default_env().add_directive(d),
            Err(_) => EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        }
    };

    if args.json {
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
