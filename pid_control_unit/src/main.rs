//! # PID Control Unit
//!
//! Runs one PID engine on its background compute thread and closes the loop
//! against a simulated motor axis. The host side runs on the main thread at
//! `simulation.host_hz`: it computes `error = setpoint − position`, performs
//! a solve cycle (config + error in, snapshot out) and advances the plant with
//! the published output.

use clap::Parser;
use pid_common::config::LogLevel;
use pid_common::pid::HostInputs;
use pid_control_unit::config::{PidUnitConfig, load_config};
use pid_control_unit::control::output::encode_output_word;
use pid_control_unit::host::HostAdapter;
use pid_control_unit::sim::MotorPlant;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// PID Control Unit: periodic background PID loop
#[derive(Parser, Debug)]
#[command(name = "pid_control_unit")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Background PID loop driven by a simulated host")]
struct Args {
    /// Path to the unit configuration TOML.
    #[arg(default_value = "config/pid.toml")]
    config: PathBuf,

    /// Stop after this many seconds (0 = until Ctrl+C).
    #[arg(long, default_value_t = 10)]
    duration_secs: u64,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,

    /// Print every host cycle's snapshot to stdout as a JSON line.
    #[arg(long)]
    emit_snapshots: bool,
}

fn main() {
    let args = Args::parse();

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, LogLevel::Info);
            error!("FATAL: {e}");
            process::exit(1);
        }
    };
    setup_tracing(&args, config.shared.log_level);

    info!(
        "PID Control Unit v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("PID Control Unit shutdown complete");
}

fn run(args: &Args, config: &PidUnitConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        variant = config.variant.name(),
        compute_hz = config.pid.compute_hz,
        host_hz = config.simulation.host_hz,
        "Config OK"
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut host = HostAdapter::new(config.variant);
    let mut plant = MotorPlant::new(&config.simulation);
    let host_period = config.simulation.host_period()?;
    let deadline = (args.duration_secs > 0)
        .then(|| Instant::now() + Duration::from_secs(args.duration_secs));

    let mut inputs = HostInputs {
        error: config.simulation.setpoint - plant.position,
        config: config.pid,
        enable: true,
        reset: false,
    };
    let mut last = Instant::now();
    let mut cycles: u64 = 0;

    while running.load(Ordering::SeqCst) && deadline.is_none_or(|d| Instant::now() < d) {
        let now = Instant::now();
        let elapsed = now.duration_since(last).as_secs_f64();
        last = now;

        inputs.error = config.simulation.setpoint - plant.position;
        let outputs = host.solve(&inputs)?;
        let snapshot = host.snapshot().unwrap_or_default();
        plant.advance(snapshot.output, elapsed);
        cycles += 1;

        if args.emit_snapshots {
            println!("{}", serde_json::to_string(&snapshot)?);
        }
        debug!(
            error = inputs.error,
            out = outputs.output,
            p = outputs.p_out,
            i = outputs.i_out,
            d = outputs.d_out,
            dt = outputs.dt,
            word = ?encode_output_word(snapshot.output),
            "host cycle"
        );
        if cycles % config.simulation.host_hz.ceil().max(1.0) as u64 == 0 {
            info!(
                position = plant.position,
                output = snapshot.output,
                seq = snapshot.seq,
                "tracking"
            );
        }

        std::thread::sleep(host_period.saturating_sub(now.elapsed()));
    }

    let status = host.status().unwrap_or_default();
    host.shutdown()?;

    if let Some(fault) = &status.last_fault {
        warn!("last step fault: {fault}");
    }
    info!(
        host_cycles = cycles,
        steps = status.steps,
        faults = status.faults,
        final_position = plant.position,
        setpoint = config.simulation.setpoint,
        "run finished"
    );
    Ok(())
}

/// Setup tracing subscriber from CLI flags and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    // Logs go to stderr so `--emit-snapshots` keeps stdout machine-readable.
    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .compact()
            .init();
    }
}
