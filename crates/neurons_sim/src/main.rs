use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use neurons_core::{FixedRateScheduler, FrameScheduler, NeuronConfig, SteppedClock, SurfaceSize};
use neurons_sim::{write_csv, HeadlessRun};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "neurons-sim")]
#[command(about = "Run the neuron field headless and record per-frame activity")]
struct Cli {
    #[command(flatten)]
    params: NeuronConfig,

    /// TOML file with neuron parameters (replaces the flags above)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Pace frames at 60 Hz instead of running back to back
    #[arg(long)]
    realtime: bool,

    /// Write per-frame stats to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Surface width in pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Surface height in pixels
    #[arg(long, default_value_t = 800.0)]
    height: f32,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Log debug events from the simulation
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(json: bool, verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let result = if json {
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(level)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = tracing_subscriber::fmt().with_max_level(level).finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => NeuronConfig::load(path)
            .with_context(|| format!("loading neuron config from {}", path.display()))?,
        None => cli.params.clone(),
    };
    info!(config = ?config, "Starting headless neuron field");

    let size = SurfaceSize::new(cli.width, cli.height);
    let mut run = HeadlessRun::new(config, size).context("invalid neuron parameters")?;

    let mut scheduler: Box<dyn FrameScheduler> = if cli.realtime {
        Box::new(FixedRateScheduler::default())
    } else {
        Box::new(SteppedClock::default())
    };
    let (stats, summary) = run.run(cli.frames, scheduler.as_mut());

    println!(
        "Frames: {} | Neurons: {} | Fired: {} | Propagated: {} | Mean active: {:.1}% | {:.1} fps",
        summary.frames,
        summary.neurons,
        summary.total_fired,
        summary.total_propagated,
        summary.mean_active_fraction * 100.0,
        summary.final_fps
    );

    if let Some(path) = &cli.csv {
        write_csv(path, &stats).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), rows = stats.len(), "Frame stats written");
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.json_logs, cli.verbose);

    if let Err(e) = run(cli) {
        error!(error = %format!("{:#}", e), "Fatal Error");
        std::process::exit(1);
    }
}
