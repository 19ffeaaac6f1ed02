//! SieveSim - workload simulator for the SIEVE cache

mod report;
mod walkthrough;
mod workload;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::workload::{WorkloadConfig, WorkloadKind};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive a cache with a generated key stream and report hit ratio
    Run(RunArgs),
    /// Replay a small trace step by step, showing order, visited bits and hand
    Walkthrough,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Cache capacity (number of items)
    #[arg(short, long, default_value_t = 1000)]
    capacity: usize,

    /// Number of operations
    #[arg(short, long, default_value_t = 1_000_000)]
    ops: u64,

    /// Size of the key space
    #[arg(short, long, default_value_t = 10_000)]
    keys: u64,

    /// Key stream shape
    #[arg(short, long, value_enum, default_value_t = WorkloadKind::Hotset)]
    workload: WorkloadKind,

    /// Fraction of the key space that is hot (hotset only)
    #[arg(long, default_value_t = 0.1)]
    hot_fraction: f64,

    /// Probability that a key is drawn from the hot set (hotset only)
    #[arg(long, default_value_t = 0.9)]
    hot_weight: f64,

    /// Fraction of operations that are reads; a read miss inserts the key
    #[arg(long, default_value_t = 1.0)]
    get_ratio: f64,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn workload_config(&self) -> WorkloadConfig {
        WorkloadConfig {
            kind: self.workload,
            capacity: self.capacity,
            ops: self.ops,
            keys: self.keys,
            hot_fraction: self.hot_fraction,
            hot_weight: self.hot_weight,
            get_ratio: self.get_ratio,
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let config = args.workload_config();
            info!(
                "Running {:?} workload: capacity={} ops={} keys={}",
                config.kind, config.capacity, config.ops, config.keys
            );

            let report = workload::run(&config)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
        }
        Command::Walkthrough => {
            for line in walkthrough::run()? {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
