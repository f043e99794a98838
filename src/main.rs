use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use renbot::cli::CliSession;
use renbot::search::SearchParams;

#[derive(Parser, Debug)]
#[command(author, version, about = "Gomoku engine with Monte Carlo tree search", long_about = None)]
struct Args {
    /// Time budget per search in milliseconds
    #[arg(long, default_value_t = 5000)]
    movetime: u64,

    /// Iteration cap per search
    #[arg(long, default_value_t = 10_000_000)]
    max_iterations: u64,

    /// Number of playout worker threads
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Seed for the playout randomness
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print each search report as a JSON line
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let params = SearchParams {
        max_iterations: args.max_iterations,
        movetime: Some(Duration::from_millis(args.movetime)),
        threads: args.threads,
        seed: args.seed,
    };

    let mut session = CliSession::new(params, args.json)?;
    session.run_loop()
}
