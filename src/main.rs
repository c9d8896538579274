//! crossword-stats - personal NYT crossword solving statistics.
//!
//! Fetches one account's stats, streaks, and per-puzzle solve records,
//! caching responses locally, and prints streak and solve-time summaries.

mod api;
mod auth;
mod cache;
mod config;
mod models;
mod report;

use std::io;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::{ApiClient, Fetcher};
use cache::CacheStore;

/// Default trailing window for the recent-puzzles report
const DEFAULT_WEEKS: i64 = 4;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: crossword-stats [--weeks <n>] [--puzzle <id>]");
    eprintln!();
    eprintln!("  --weeks <n>    Trailing window for the recent-puzzles report (default {})", DEFAULT_WEEKS);
    eprintln!("  --puzzle <id>  Show the solve record for one puzzle and exit");
}

enum Command {
    Report { weeks: i64 },
    Puzzle { puzzle_id: u64 },
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut weeks = DEFAULT_WEEKS;
    let mut puzzle_id = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--weeks" => {
                let value = iter.next().context("--weeks requires a value")?;
                weeks = value
                    .parse()
                    .with_context(|| format!("Invalid --weeks value: {}", value))?;
            }
            "--puzzle" => {
                let value = iter.next().context("--puzzle requires a value")?;
                puzzle_id = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid --puzzle value: {}", value))?,
                );
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }

    Ok(match puzzle_id {
        Some(puzzle_id) => Command::Puzzle { puzzle_id },
        None => Command::Report { weeks },
    })
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    let credentials_path = config::credentials_path()?;
    let credentials = auth::load(&credentials_path)
        .with_context(|| format!("Failed to load credentials from {}", credentials_path.display()))?;

    let fetcher = Fetcher::new(
        ApiClient::new(),
        CacheStore::new(config::cache_dir()?),
        credentials.clone(),
    );

    match command {
        Command::Report { weeks } => report::run(&fetcher, weeks),
        Command::Puzzle { puzzle_id } => report::run_puzzle(&fetcher, puzzle_id),
    }
}
