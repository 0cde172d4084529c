//! Biathlon Results Library
//!
//! Turns a chronological log of race-timing events into a ranked results
//! table.
//!
//! # Architecture
//!
//! - Parses feed lines into typed events (`events`)
//! - Folds events into per-competitor state, including the cross-competitor
//!   disqualification sweep run on every start (`processor`)
//! - Ranks competitors and renders result rows (`report`)
//!
//! Reading configuration files and wiring the process together is left to
//! the application layer (biathlon-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use biathlon_core::{EventProcessor, RaceConfig, ReportBuilder, StdoutAudit};
//! use std::fs::File;
//! use std::io::BufReader;
//! use std::path::Path;
//!
//! let config = RaceConfig::new().with_laps(2).with_start_delta("00:01:30");
//! let feed = BufReader::new(File::open("events").unwrap());
//!
//! let statistics = EventProcessor::new(config.clone())
//!     .unwrap()
//!     .process_reader(feed, &mut StdoutAudit)
//!     .unwrap();
//!
//! ReportBuilder::new(&config, &statistics)
//!     .write_file(Path::new("report"))
//!     .unwrap();
//! ```

// Public modules
pub mod config;
pub mod events;
pub mod processor;
pub mod report;
pub mod state;
pub mod time_codec;
pub mod types;

// Re-export main types for convenience
pub use config::{RaceConfig, SHOTS_PER_VISIT};
pub use events::{EventKind, RaceEvent};
pub use processor::{disqualification_sweep, AuditSink, EventProcessor, Statistics, StdoutAudit};
pub use report::ReportBuilder;
pub use state::{CompetitorState, Standing};
pub use types::{Duration, RaceError, Result, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
