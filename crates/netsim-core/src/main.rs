//! Headless Network Simulator
//!
//! Builds a network from config, keeps the layout relaxing in the background
//! and steps opinion epochs on a timer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use netsim::output::{CsvLogger, EpochSink, DEFAULT_OUTPUT_DIR};
use netsim::{PhysicsLoop, SharedSimulation, SimConfig, Simulation, DEFAULT_CONFIG_PATH};

/// Command line arguments for the simulator
#[derive(Parser, Debug)]
#[command(name = "netsim")]
#[command(about = "Belief spread over a growing social network")]
struct Args {
    /// Tuning file (defaults are used when it is absent)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of agents in the initial network
    #[arg(long)]
    agents: Option<usize>,

    /// Number of epochs to run
    #[arg(long)]
    epochs: Option<u64>,

    /// Layout ticks per second
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Grow a new agent next to this agent index after each epoch (repeatable)
    #[arg(long)]
    grow_at: Vec<usize>,

    /// Write per-epoch CSV rows into this directory
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_OUTPUT_DIR)]
    log: Option<PathBuf>,

    /// Write the final layout as JSON to this file
    #[arg(long)]
    export_layout: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("netsim=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        tracing::info!(path = %args.config.display(), "loading config");
        SimConfig::load(&args.config)?
    } else {
        tracing::info!(path = %args.config.display(), "config not found, using defaults");
        SimConfig::default()
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(agents) = args.agents {
        config.simulation.agent_count = agents;
    }
    if let Some(epochs) = args.epochs {
        config.simulation.epochs = epochs;
    }
    if let Some(rate) = args.tick_rate {
        config.simulation.tick_rate_hz = rate;
    }

    let run = config.simulation.clone();
    let sim = SharedSimulation::new(Simulation::new(config)?);
    let physics = PhysicsLoop::spawn(sim.clone(), run.tick_rate_hz);

    let mut logger = match &args.log {
        Some(dir) => {
            let mut logger = CsvLogger::new(dir)?;
            logger.set_allow_output(true);
            Some(logger)
        }
        None => None,
    };

    let interval = Duration::from_millis(run.epoch_interval_ms);
    for _ in 0..run.epochs {
        let snapshot = sim.step_epoch(logger.as_mut().map(|l| l as &mut dyn EpochSink));
        tracing::info!(
            epoch = snapshot.epoch,
            mean_belief = snapshot.mean_belief(),
            conflicts = snapshot.total_conflicts(),
            "epoch complete"
        );

        if run.fraternize_every > 0 && snapshot.epoch % run.fraternize_every == 0 {
            sim.fraternize();
        }
        for &index in &args.grow_at {
            if let Err(e) = sim.grow_at(index) {
                tracing::warn!(index, error = %e, "growth request rejected");
            }
        }

        thread::sleep(interval);
    }

    physics.shutdown();

    if let Some(path) = &args.export_layout {
        let layout = sim.layout();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &layout)?;
        writer.flush()?;
        tracing::info!(
            path = %path.display(),
            nodes = layout.nodes.len(),
            edges = layout.edges.len(),
            "layout exported"
        );
    }

    Ok(())
}
