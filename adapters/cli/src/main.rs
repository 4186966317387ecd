#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line runner that plays dungeon puzzle scenarios.

mod scenario;
mod script;

use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::scenario::{Report, Scenario};

#[derive(Debug, Parser)]
#[command(name = "dungeon-puzzle")]
#[command(about = "Spawns, scales and clears the monster groups of a puzzle scenario")]
struct Args {
    /// Scenario TOML file describing the puzzle.
    #[arg(long)]
    scenario: PathBuf,

    /// Overrides the seed declared by the scenario.
    #[arg(long)]
    seed: Option<u64>,

    /// Kills every monster from its own thread.
    #[arg(long)]
    kill_threads: bool,
}

/// Entry point for the dungeon puzzle command-line interface.
fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(&args) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<Report> {
    let scenario = Scenario::load(&args.scenario)?;
    let seed = args.seed.unwrap_or_else(|| scenario.seed());
    scenario.build(seed)?.run(args.kill_threads)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
