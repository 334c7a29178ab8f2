//! Headless entry point for particle-mesh runs.
//!
//! Loads a [`Config`] (defaults, optionally overridden by a TOML file and
//! command-line flags), runs the simulation and logs a summary of the
//! recorded history via the [`report`] module.

mod report;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pm_core::{Config, Simulation};

#[derive(Parser, Debug)]
#[command(about = "2-D periodic particle-mesh gravity")]
struct Args {
    /// TOML file with `Config` fields; missing fields keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of steps.
    #[arg(long)]
    steps: Option<usize>,

    /// Override the placement seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Percentile of the speed distribution reported for colour scaling.
    #[arg(long, default_value_t = 99.0)]
    percentile: f64,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(steps) = args.steps {
        cfg.steps = steps;
    }
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cfg = load_config(&args)?;
    log::debug!("{cfg:?}");

    let mut sim = Simulation::new(cfg)?;
    let history = sim.run()?;

    let summary = report::Summary::from_history(history, args.percentile);
    log::info!("{summary}");
    Ok(())
}
