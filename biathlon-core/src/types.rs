//! Core types for the biathlon results library
//!
//! Timestamps are wall-clock readings with no calendar date attached, exactly
//! as they appear in the event feed. Durations are signed so that elapsed time
//! between out-of-order clock readings stays representable.

/// Timestamp type used throughout the library (clock time, millisecond precision)
pub type Timestamp = chrono::NaiveTime;

/// Signed elapsed time between two timestamps
pub type Duration = chrono::Duration;

/// Result type for race processing operations
pub type Result<T> = std::result::Result<T, RaceError>;

/// Errors that can occur while processing a race
#[derive(Debug, thiserror::Error)]
pub enum RaceError {
    #[error("Malformed event {line:?}: {reason}")]
    MalformedEvent { line: String, reason: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Unknown competitor: {0}")]
    UnknownCompetitor(String),

    #[error("Competitor already registered: {0}")]
    DuplicateRegistration(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RaceError {
    pub(crate) fn malformed(line: &str, reason: impl Into<String>) -> Self {
        RaceError::MalformedEvent {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}
