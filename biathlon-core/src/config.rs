//! Race configuration types
//!
//! This module defines the competition parameters the processor and the
//! report builder need. Clock values are kept as the raw text from the
//! configuration file and parsed on demand, so a malformed value surfaces as
//! a `ConfigParseError` when the race is processed.

use crate::time_codec;
use crate::types::{Duration, RaceError, Result, Timestamp};
use serde::{Deserialize, Serialize};

/// Shots fired at every firing-range visit
pub const SHOTS_PER_VISIT: u32 = 5;

/// Configuration for a single competition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceConfig {
    /// Number of main laps
    pub laps: u32,

    /// Length of one penalty lap in meters
    #[serde(rename = "penaltyLen")]
    pub penalty_lap_length: u32,

    /// Length of one main lap in meters
    #[serde(rename = "lapLen")]
    pub lap_length: u32,

    /// Number of firing lines on the course
    pub firing_lines: u32,

    /// Race start time (`hh:mm:ss[.mmm]`)
    pub start: String,

    /// Gap between scheduled starts (`hh:mm:ss[.mmm]`)
    pub start_delta: String,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            laps: 1,
            penalty_lap_length: 150,
            lap_length: 3500,
            firing_lines: 1,
            start: "09:30:00.000".to_string(),
            start_delta: "00:00:30".to_string(),
        }
    }
}

impl RaceConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of main laps
    pub fn with_laps(mut self, laps: u32) -> Self {
        self.laps = laps;
        self
    }

    /// Builder method: set the main lap length in meters
    pub fn with_lap_length(mut self, meters: u32) -> Self {
        self.lap_length = meters;
        self
    }

    /// Builder method: set the penalty lap length in meters
    pub fn with_penalty_lap_length(mut self, meters: u32) -> Self {
        self.penalty_lap_length = meters;
        self
    }

    /// Builder method: set the number of firing lines
    pub fn with_firing_lines(mut self, firing_lines: u32) -> Self {
        self.firing_lines = firing_lines;
        self
    }

    /// Builder method: set the race start time
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    /// Builder method: set the gap between scheduled starts
    pub fn with_start_delta(mut self, start_delta: impl Into<String>) -> Self {
        self.start_delta = start_delta.into();
        self
    }

    /// Check every value the race needs before any event is applied.
    ///
    /// A race needs at least one lap, and both clock values must parse.
    pub fn validate(&self) -> Result<()> {
        if self.laps == 0 {
            return Err(RaceError::ConfigParseError(
                "laps must be at least 1".to_string(),
            ));
        }
        self.race_start()?;
        self.start_interval()?;
        Ok(())
    }

    /// Parsed race start time
    pub fn race_start(&self) -> Result<Timestamp> {
        time_codec::parse_clock(&self.start)
    }

    /// Parsed gap between scheduled starts
    pub fn start_interval(&self) -> Result<Duration> {
        time_codec::parse_clock(&self.start_delta).map(time_codec::timestamp_to_duration)
    }

    /// Number of shots a competitor fires over `visits` firing-range visits
    pub fn shots_for_visits(visits: u32) -> u32 {
        visits * SHOTS_PER_VISIT
    }

    /// Check if a firing range number lies within the configured firing lines
    pub fn is_known_firing_line(&self, firing_line: u32) -> bool {
        (1..=self.firing_lines).contains(&firing_line)
    }
}
