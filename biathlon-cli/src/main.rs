//! Biathlon Results CLI Application
//!
//! This is the command-line interface for the biathlon results processor.
//! It uses the biathlon-core library and adds:
//! - JSON configuration loading
//! - Reading the event feed from a file
//! - Printing the audit stream to stdout
//! - Writing the results table to a file

use anyhow::{Context, Result};
use biathlon_core::{EventProcessor, ReportBuilder, StdoutAudit};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

mod config;

/// Biathlon Results - Build a results table from race events
#[derive(Parser, Debug)]
#[command(name = "biathlon-cli")]
#[command(about = "Build a biathlon results table from a race event log", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the race configuration (JSON)
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,

    /// Path to the event feed
    #[arg(short, long, value_name = "FILE", default_value = "events")]
    events: PathBuf,

    /// Output file for the results table
    #[arg(short, long, value_name = "FILE", default_value = "report")]
    output: PathBuf,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors (audit lines on stdout are still printed)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Biathlon Results CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using biathlon-core library v{}", biathlon_core::VERSION);

    log::info!("Loading configuration from: {:?}", args.config);
    let race_config = config::load_config(&args.config)?;
    log::debug!("Configuration loaded: {:?}", race_config);

    let events = File::open(&args.events)
        .with_context(|| format!("Failed to open events file: {:?}", args.events))?;

    let statistics = EventProcessor::new(race_config.clone())?
        .process_reader(BufReader::new(events), &mut StdoutAudit)
        .with_context(|| format!("Failed to process events file: {:?}", args.events))?;

    ReportBuilder::new(&race_config, &statistics)
        .write_file(&args.output)
        .with_context(|| format!("Failed to write report: {:?}", args.output))?;

    Ok(())
}

/// Initialize logging on stderr; `RUST_LOG` overrides the flag-derived level
fn init_logging(verbose: u8, quiet: bool) {
    use log::LevelFilter;
    use std::io::Write;

    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            let ts = buf.timestamp_millis();
            writeln!(buf, "{} [{} {}] {}", ts, record.level(), record.target(), record.args())
        })
        .init();
}
