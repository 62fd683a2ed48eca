#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates and previews dot stimulus sequences.

mod output;
mod settings;

use std::path::PathBuf;

use anyhow::{anyhow, ensure, Context, Result};
use clap::{Parser, Subcommand};
use dot_stimulus_core::{SeededRandomSource, Waypoint};
use dot_stimulus_system_playback::Timeline;
use dot_stimulus_system_waypoint_generation::WaypointSequenceGenerator;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    output::{render_samples, render_segments, OutputFormat},
    settings::ProtocolSettings,
};

#[derive(Debug, Parser)]
#[command(
    name = "dot-stimulus",
    version,
    about = "Generates random-walk waypoint sequences for a moving dot stimulus"
)]
struct Cli {
    /// TOML protocol file; protocol defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed for the random walk, overriding any seed in the protocol file.
    #[arg(long)]
    seed: Option<u64>,
    /// Default log filter, overridden by `RUST_LOG`.
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Prints the generated segment sequence.
    Segments {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Prints dot positions sampled along the playback timeline.
    Sample {
        /// Samples per second of playback.
        #[arg(long, default_value_t = 60.0)]
        rate: f64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

/// Entry point for the dot stimulus command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let settings = match &cli.config {
        Some(path) => {
            let settings = ProtocolSettings::load(path)?;
            info!(path = %path.display(), "loaded protocol settings");
            settings
        }
        None => ProtocolSettings::default(),
    };

    let seed = cli
        .seed
        .or(settings.seed)
        .unwrap_or_else(rand::random::<u64>);
    let config = settings.generator_config();
    info!(
        seed,
        segment_count = config.segment_count,
        time_base = %config.time_base,
        "generating waypoint sequence"
    );

    let mut rng = SeededRandomSource::new(seed);
    let segments = WaypointSequenceGenerator
        .generate(&config, &mut rng)
        .context("protocol settings rejected by the waypoint generator")?;
    info!(segments = segments.len(), "generated waypoint sequence");

    let rendered = match cli.command {
        CliCommand::Segments { format } => render_segments(&segments, format)?,
        CliCommand::Sample { rate, format } => {
            let timeline = Timeline::new(segments, config.time_base);
            let samples = sample_timeline(&timeline, rate)?;
            info!(
                rate,
                samples = samples.len(),
                duration = timeline.duration(),
                "sampled playback timeline"
            );
            render_samples(&samples, format)?
        }
    };
    print!("{rendered}");
    Ok(())
}

fn sample_timeline(timeline: &Timeline, rate: f64) -> Result<Vec<Waypoint>> {
    ensure!(
        rate.is_finite() && rate > 0.0,
        "--rate must be a finite positive number of samples per second, got {rate}"
    );
    timeline
        .sample(rate)
        .with_context(|| format!("cannot sample the playback timeline at {rate} Hz"))
}

fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .with_context(|| format!("invalid log level `{default_level}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}
