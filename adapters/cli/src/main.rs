#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line driving loop for the Surge spawn engine.
//!
//! The binary owns every collaborator: it constructs the world, the emission
//! system, and the observers, then runs a fixed-tick loop that applies
//! commands to the world, feeds the resulting events back into the systems,
//! and pushes each progress snapshot to the observers directly.

mod config;
mod preset;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use surge_core::{Command, ProgressObserver, ProgressSnapshot};
use surge_system_emission::Emission;
use surge_system_telemetry::Telemetry;
use surge_world::{self as world, World};

use crate::config::ScheduleFile;

/// Paces unit spawning along an authored rate curve.
#[derive(Debug, Parser)]
#[command(name = "surge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Runs a spawn schedule to completion.
    Run {
        /// Path to a TOML schedule file.
        #[arg(long, conflicts_with = "preset")]
        config: Option<PathBuf>,
        /// Single-line preset string produced by `encode`.
        #[arg(long)]
        preset: Option<String>,
        /// Fixed simulation tick rate in Hz.
        #[arg(long, default_value_t = 60)]
        tick_hz: u32,
        /// Overrides the schedule's per-tick burst cap.
        #[arg(long)]
        burst_cap: Option<u32>,
    },
    /// Encodes a TOML schedule file into a shareable preset string.
    Encode {
        /// Path to a TOML schedule file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    match Cli::parse().command {
        CliCommand::Run {
            config,
            preset,
            tick_hz,
            burst_cap,
        } => run(config, preset, tick_hz, burst_cap),
        CliCommand::Encode { config } => encode(&config),
    }
}

fn run(
    config: Option<PathBuf>,
    preset: Option<String>,
    tick_hz: u32,
    burst_cap: Option<u32>,
) -> anyhow::Result<()> {
    let mut file = load_schedule(config, preset)?;
    if burst_cap.is_some() {
        file.schedule.burst_cap = burst_cap;
    }
    anyhow::ensure!(tick_hz > 0, "tick rate must be positive");
    let dt = Duration::from_secs_f64(1.0 / f64::from(tick_hz));

    let max_count = file.schedule.max_count;
    let time_span_secs = file.schedule.time_span_secs;
    let mut emission = Emission::new(file.into_emission_config()?)?;
    let mut world = World::new();
    let mut telemetry = Telemetry::new();
    let mut reporter = ProgressReporter::default();

    log::info!("pacing {max_count} units over {time_span_secs}s at {tick_hz}Hz");

    while !emission.is_complete() {
        let mut events = Vec::new();
        world::apply(&mut world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        emission.handle(&events, &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        telemetry.handle(&events);

        let snapshot = emission.last_snapshot();
        let observers: [&mut dyn ProgressObserver; 2] = [&mut telemetry, &mut reporter];
        for observer in observers {
            observer.on_progress(&snapshot);
        }
    }

    println!("{}", telemetry.report());
    Ok(())
}

fn encode(config: &Path) -> anyhow::Result<()> {
    let file = ScheduleFile::load(config)?;
    let _ = file
        .clone()
        .into_emission_config()
        .context("schedule failed validation")?;
    println!("{}", preset::encode(&file));
    Ok(())
}

fn load_schedule(config: Option<PathBuf>, preset: Option<String>) -> anyhow::Result<ScheduleFile> {
    match (config, preset) {
        (Some(path), None) => ScheduleFile::load(&path),
        (None, Some(value)) => Ok(preset::decode(&value)?),
        _ => anyhow::bail!("provide a schedule via --config or --preset"),
    }
}

/// Logs progress once for every ten percent of curve area covered.
#[derive(Debug, Default)]
struct ProgressReporter {
    reported_deciles: u32,
}

impl ProgressObserver for ProgressReporter {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        let decile = (snapshot.percent_area / 10.0).floor() as u32;
        if decile > self.reported_deciles {
            self.reported_deciles = decile;
            log::info!(
                "progress: {:.1}% area, {:.1}% time, {:.2?} elapsed",
                snapshot.percent_area,
                snapshot.percent_time,
                snapshot.real_time_elapsed,
            );
        }
    }
}
