// ROV Simulator
// Drives one simulated vehicle on a wall-clock interval and flies a mission file

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mission_control::MissionController;
use rov_simulator::{journal, SimulatorConfig, TickReport, VehicleKernel};
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "rov_simulator=info,motion_engine=info,telemetry_monitor=info,mission_control=info";

#[derive(Parser, Debug)]
#[command(name = "rov-simulator", about = "Tick-driven underwater vehicle simulator")]
struct Args {
    /// Simulator config JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mission JSON to upload and start
    #[arg(short, long)]
    mission: Option<PathBuf>,

    /// Tick period in milliseconds (overrides config)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Simulated seconds per wall-clock second (overrides config)
    #[arg(long)]
    time_scale: Option<f64>,

    /// Stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Log a status line every N ticks
    #[arg(long, default_value_t = 10)]
    report_every: u64,

    /// Append alerts and mission events to this JSON-lines file
    #[arg(long)]
    event_log: Option<PathBuf>,

    /// Print the mission template and exit
    #[arg(long)]
    export_template: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if args.export_template {
        println!("{}", MissionController::export_template()?);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };
    if let Some(ms) = args.interval_ms {
        config.tick_interval_ms = ms;
    }
    if let Some(scale) = args.time_scale {
        config.time_scale = scale;
    }

    let mut kernel = VehicleKernel::new(&config);

    if let Some(path) = &args.event_log {
        journal::attach(&mut kernel, path)?;
        info!("Journaling alerts and events to {:?}", path);
    }

    let flying = match &args.mission {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading mission {}", path.display()))?;
            kernel.missions_mut().upload_mission(&json)?;
            kernel.missions_mut().start_mission()?;
            true
        }
        None => false,
    };

    let start = config.start_position;
    info!(
        "Vehicle launched at {:.5}, {:.5} (tick {} ms, dt {:.3} s)",
        start.lat,
        start.lon,
        config.tick_interval_ms,
        config.dt()
    );

    let dt = config.dt();
    let mut interval = time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted - stopping simulation");
                break;
            }
        }

        let report = kernel.tick(dt);
        if args.report_every > 0 && report.tick % args.report_every == 0 {
            log_status(&kernel, &report);
        }

        if args.max_ticks.is_some_and(|max| report.tick >= max) {
            info!("Reached {} ticks", report.tick);
            break;
        }
        if flying && kernel.is_settled() {
            info!("Mission finished and vehicle recovered");
            break;
        }
    }

    summarize(&kernel);
    Ok(())
}

fn log_status(kernel: &VehicleKernel, report: &TickReport) {
    let telemetry = kernel.monitor().get_telemetry();
    let progress = kernel.missions().get_mission().map_or(0, |m| m.progress);
    info!(
        "t={:>7.1}s depth={:>6.1}m hdg={:>5.1} status={:?} battery={:.1}% link={:?} mission={}%",
        report.elapsed,
        report.state.position.depth,
        report.state.heading,
        report.state.status,
        telemetry.battery.level,
        telemetry.communication.connection_type,
        progress
    );
}

fn summarize(kernel: &VehicleKernel) {
    let state = kernel.engine().state();
    let telemetry = kernel.monitor().get_telemetry();

    info!("{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Ticks: {} ({:.1} simulated s)", kernel.ticks(), kernel.elapsed());
    info!(
        "Final position: {:.5}, {:.5} at {:.1} m ({:?})",
        state.position.lat, state.position.lon, state.position.depth, state.status
    );
    info!("Battery: {:.1}%", telemetry.battery.level);
    info!("Alerts retained: {}", kernel.monitor().get_alerts().len());
    if let Some(mission) = kernel.missions().get_mission() {
        info!(
            "Mission {}: {} ({}%, {}/{} waypoints)",
            mission.id,
            mission.status,
            mission.progress,
            mission.completed_count(),
            mission.waypoints.len()
        );
    }
}
