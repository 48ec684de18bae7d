/*
 * Boid Flocking Simulation - Headless Driver
 *
 * Runs the flocking core for a fixed number of ticks and periodically logs
 * flock statistics. Parameters come from an optional flat JSON file; the
 * backend, seed and boid count can be overridden on the command line.
 *
 * Logging is controlled with RUST_LOG (defaults to `info`).
 */

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flocking::{Backend, Simulation, SimulationParams};

#[derive(Parser, Debug)]
#[command(name = "flocking", version, about = "Run a headless boid flocking simulation")]
struct Cli {
    /// Flat JSON parameter file; missing keys use the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Execution backend.
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    /// Seed for the initial population; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of boids from the parameter file.
    #[arg(long)]
    count: Option<usize>,

    /// Log flock statistics every N ticks (0 disables periodic reports).
    #[arg(long, default_value_t = 60)]
    report_every: u64,

    /// Write the default parameters to this path and exit.
    #[arg(long)]
    write_default_config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    Auto,
    Sequential,
    Parallel,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => Backend::Auto,
            BackendArg::Sequential => Backend::Sequential,
            BackendArg::Parallel => Backend::Parallel,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.write_default_config {
        SimulationParams::default()
            .save(path)
            .with_context(|| format!("writing default parameters to {}", path.display()))?;
        info!(path = %path.display(), "wrote default parameters");
        return Ok(());
    }

    let mut params = match &cli.config {
        Some(path) => SimulationParams::load(path).context("loading simulation parameters")?,
        None => SimulationParams::default(),
    };
    if let Some(count) = cli.count {
        params.num_boids = count;
    }

    let backend = Backend::from(cli.backend);
    let mut simulation = match cli.seed {
        Some(seed) => Simulation::with_seed(params, backend, seed),
        None => Simulation::new(params, backend),
    };

    for tick in 1..=cli.ticks {
        simulation.tick();
        if cli.report_every > 0 && tick % cli.report_every == 0 {
            info!("{}", simulation.debug_info());
        }
    }

    let summary = simulation.debug_info();
    info!(
        ticks = summary.tick,
        backend = ?simulation.backend(),
        centroid = ?summary.centroid,
        param_uploads = summary.param_uploads,
        "run complete: {}",
        summary
    );

    Ok(())
}
