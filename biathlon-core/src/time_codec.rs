//! Clock time codec
//!
//! Every timestamp and duration is rendered as `hh:mm:ss.mmm`. Durations are
//! formatted by mapping them onto a fixed reference epoch (midnight) and then
//! reusing the timestamp formatter, so a duration of 90 seconds renders as
//! `00:01:30.000`.

use crate::types::{Duration, RaceError, Result, Timestamp};

/// Format used for timestamps in the event feed and in the report
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

/// Lenient format for configuration values (fraction optional)
const CLOCK_OFFSET_FORMAT: &str = "%H:%M:%S%.f";

/// Reference epoch durations are mapped onto for rendering
pub const REFERENCE_EPOCH: Timestamp = Timestamp::MIN;

/// Parse a `hh:mm:ss.mmm` timestamp.
///
/// The text must have exactly two-digit fields and three fraction digits;
/// chrono alone would accept a missing fraction.
pub fn parse_timestamp(text: &str) -> Result<Timestamp> {
    if !has_timestamp_shape(text) {
        return Err(RaceError::InvalidTimestamp(format!(
            "{:?} does not match hh:mm:ss.mmm",
            text
        )));
    }
    Timestamp::parse_from_str(text, TIMESTAMP_FORMAT)
        .map_err(|e| RaceError::InvalidTimestamp(format!("{:?}: {}", text, e)))
}

fn has_timestamp_shape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 12
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b':',
            8 => *b == b'.',
            _ => b.is_ascii_digit(),
        })
}

/// Parse a configuration clock value such as `00:03:00` or `09:30:00.000`
pub fn parse_clock(text: &str) -> Result<Timestamp> {
    Timestamp::parse_from_str(text.trim(), CLOCK_OFFSET_FORMAT)
        .map_err(|e| RaceError::ConfigParseError(format!("invalid clock value {:?}: {}", text, e)))
}

/// Render a timestamp as `hh:mm:ss.mmm`
pub fn format_timestamp(t: Timestamp) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Map a duration onto the reference epoch.
///
/// The result only exists to be formatted; values of a day or more wrap
/// around the clock, as do negative values.
pub fn duration_to_timestamp(d: Duration) -> Timestamp {
    REFERENCE_EPOCH.overflowing_add_signed(d).0
}

/// Elapsed time since the reference epoch
pub fn timestamp_to_duration(t: Timestamp) -> Duration {
    t.signed_duration_since(REFERENCE_EPOCH)
}

/// Render a duration as `hh:mm:ss.mmm`
pub fn format_duration(d: Duration) -> String {
    format_timestamp(duration_to_timestamp(d))
}
