mod config;
mod replay;
mod simulation;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::load_config;
use shared::VideoWriter;
use simulation::Simulation;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for antsim.
#[derive(Parser)]
#[command(name = "antsim", version, about = "Headless ant simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a simulation and record it as a video.
    Record {
        /// Path to the TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Video file to write. Overrides the configured output.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of ticks to simulate. Overrides the configured tick count.
        #[arg(short, long)]
        ticks: Option<u32>,
    },
    /// Decode a recorded video and report what it contains.
    Replay {
        /// Video file to read.
        path: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn record(config: Option<PathBuf>, output: Option<PathBuf>, ticks: Option<u32>) -> Result<()> {
    let mut config = load_config(config.as_deref())?;
    if let Some(output) = output {
        config.output = output;
    }
    if let Some(ticks) = ticks {
        config.ticks = ticks;
    }

    let file = File::create(&config.output)
        .with_context(|| format!("failed to create video '{}'", config.output.display()))?;
    let mut video = VideoWriter::new(BufWriter::new(file))
        .context("failed to start video")?;

    let mut sim = Simulation::new(&config);
    sim.run(&mut video, config.ticks)
        .context("recording failed")?;
    video.flush().context("failed to flush video")?;

    info!(path = %config.output.display(), "video written");
    Ok(())
}

/// Main entry point for antsim.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Record {
            config,
            output,
            ticks,
        } => record(config, output, ticks),
        Command::Replay { path } => replay::run(&path),
    }
}
