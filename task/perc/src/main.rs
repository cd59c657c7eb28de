use anyhow::Context;
use clap::Parser;
use perc::{EstimatorConfig, PercolationStats};

#[derive(Parser)]
#[command(version, about = "Estimates the percolation threshold of an n-by-n grid", long_about = None)]
struct Arguments {
    /// Side length of the grid.
    grid_size: usize,

    /// Number of independent trials.
    trials: usize,

    #[arg(short, long)]
    seed: Option<u64>,

    /// Worker threads for parallel trials.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Run all trials on the main thread.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    #[arg(short, long, default_value_t = 2)]
    log_level: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();

    stderrlog::new()
        .verbosity(args.log_level)
        .module(module_path!())
        .module("perc")
        .init()?;

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("failed to set up the thread pool")?;
    }

    let mut config = EstimatorConfig::new(args.grid_size, args.trials);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.sequential {
        config = config.sequential();
    }

    let stats = PercolationStats::from_config(&config)?;
    print!("{stats}");

    Ok(())
}
