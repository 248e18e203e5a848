#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Frostbloom sessions headlessly.

mod autopilot;
mod console;
mod session;

use std::{fs, io, path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use frostbloom_core::{WorldKind, WorldProfile};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    console::ConsoleBackend,
    session::{run, SessionOptions},
};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "frostbloom", about = "Runs a Frostbloom session on autopilot")]
struct Cli {
    /// World the run starts in.
    #[arg(long, value_enum, default_value_t = WorldArg::Winter)]
    world: WorldArg,
    /// TOML profile replacing the preset of the starting world.
    #[arg(long, value_name = "FILE")]
    profile: Option<PathBuf>,
    /// Prints the effective profile as TOML and exits.
    #[arg(long)]
    print_profile: bool,
    /// Upper bound on simulated frames.
    #[arg(long, default_value_t = 3600)]
    frames: u64,
    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Seed for spawning and particle jitter.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Autopilot movement per frame, in world units.
    #[arg(long, default_value_t = 0.15)]
    step: f32,
    /// Autopilot fires every this many frames.
    #[arg(long, default_value_t = 8)]
    fire_every: u64,
    /// Prints the HUD every this many frames; zero prints only banners and end screens.
    #[arg(long, default_value_t = 60)]
    report_every: u64,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn")]
    log: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum WorldArg {
    Winter,
    Spring,
}

impl From<WorldArg> for WorldKind {
    fn from(world: WorldArg) -> Self {
        match world {
            WorldArg::Winter => Self::Winter,
            WorldArg::Spring => Self::Spring,
        }
    }
}

/// Entry point for the Frostbloom command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;

    let profile = load_profile(&cli)?;
    if cli.print_profile {
        let text = toml::to_string(&profile).context("failed to encode profile")?;
        print!("{text}");
        return Ok(());
    }

    info!(world = ?profile.world, frames = cli.frames, seed = cli.seed, "starting run");
    let mut backend = ConsoleBackend::new(io::stdout().lock(), cli.report_every);
    let report = run(
        SessionOptions {
            first: profile,
            frames: cli.frames,
            seed: cli.seed,
            frame_time: Duration::from_millis(cli.frame_ms),
            step: cli.step,
            fire_every: cli.fire_every,
        },
        &mut backend,
    )?;

    let text = toml::to_string(&report).context("failed to encode run report")?;
    println!("{text}");
    Ok(())
}

fn init_tracing(fallback: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback)
            .with_context(|| format!("invalid log filter `{fallback}`"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

fn load_profile(cli: &Cli) -> Result<WorldProfile> {
    let profile = match &cli.profile {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read profile {}", path.display()))?;
            toml::from_str::<WorldProfile>(&text)
                .with_context(|| format!("failed to parse profile {}", path.display()))?
        }
        None => WorldProfile::for_world(cli.world.into()),
    };
    profile
        .validate()
        .with_context(|| format!("{:?} profile is not playable", profile.world))?;
    Ok(profile)
}
