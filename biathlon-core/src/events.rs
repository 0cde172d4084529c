//! Event feed line parser
//!
//! Each line of the feed has the shape
//! `[hh:mm:ss.mmm] eventCode competitorId [extraParams...]`.
//! Parsing is purely structural: the parser checks field counts and
//! timestamps, it does not know whether the competitor exists.

use crate::time_codec;
use crate::types::{RaceError, Result, Timestamp};
use std::fmt;

/// Incoming event codes
pub mod codes {
    pub const REGISTERED: &str = "1";
    pub const START_TIME_DRAWN: &str = "2";
    pub const ON_START_LINE: &str = "3";
    pub const STARTED: &str = "4";
    pub const ON_FIRING_RANGE: &str = "5";
    pub const TARGET_HIT: &str = "6";
    pub const LEFT_FIRING_RANGE: &str = "7";
    pub const ENTERED_PENALTY_LAPS: &str = "8";
    pub const LEFT_PENALTY_LAPS: &str = "9";
    pub const LAP_COMPLETED: &str = "10";
    pub const CANNOT_CONTINUE: &str = "11";

    /// Outgoing: the competitor is disqualified
    pub const DISQUALIFIED: &str = "32";
    /// Outgoing: the competitor has finished
    pub const FINISHED: &str = "33";
}

/// What happened to a competitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Registered,
    /// Start time set by a draw
    StartTimeDrawn(Timestamp),
    OnStartLine,
    Started,
    /// Entered the firing range with the given number
    OnFiringRange(String),
    /// Hit the given target
    TargetHit(String),
    LeftFiringRange,
    EnteredPenaltyLaps,
    LeftPenaltyLaps,
    LapCompleted,
    /// Cannot continue, with a free-text reason
    CannotContinue(String),
    /// A code this system does not handle
    Unrecognized(String),
}

/// A single structurally valid line from the event feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceEvent {
    pub time: Timestamp,
    pub competitor_id: String,
    pub kind: EventKind,
}

impl RaceEvent {
    /// Parse one feed line
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(RaceError::malformed(line, "expected at least 3 fields"));
        }

        let time_text = fields[0].trim_start_matches('[').trim_end_matches(']');
        let time = time_codec::parse_timestamp(time_text)
            .map_err(|e| RaceError::malformed(line, format!("invalid timestamp: {}", e)))?;

        let code = fields[1];
        let competitor_id = fields[2].to_string();
        let params = &fields[3..];

        let required_param = |name: &str| -> Result<String> {
            params
                .first()
                .map(|p| p.to_string())
                .ok_or_else(|| RaceError::malformed(line, format!("missing {}", name)))
        };

        let kind = match code {
            codes::REGISTERED => EventKind::Registered,
            codes::START_TIME_DRAWN => {
                let text = required_param("start time")?;
                let start = time_codec::parse_timestamp(&text).map_err(|e| {
                    RaceError::malformed(line, format!("invalid start time: {}", e))
                })?;
                EventKind::StartTimeDrawn(start)
            }
            codes::ON_START_LINE => EventKind::OnStartLine,
            codes::STARTED => EventKind::Started,
            codes::ON_FIRING_RANGE => EventKind::OnFiringRange(required_param("firing range")?),
            codes::TARGET_HIT => EventKind::TargetHit(required_param("target")?),
            codes::LEFT_FIRING_RANGE => EventKind::LeftFiringRange,
            codes::ENTERED_PENALTY_LAPS => EventKind::EnteredPenaltyLaps,
            codes::LEFT_PENALTY_LAPS => EventKind::LeftPenaltyLaps,
            codes::LAP_COMPLETED => EventKind::LapCompleted,
            codes::CANNOT_CONTINUE => {
                EventKind::CannotContinue(text_after_fields(line, 3).to_string())
            }
            other => EventKind::Unrecognized(other.to_string()),
        };

        Ok(Self {
            time,
            competitor_id,
            kind,
        })
    }
}

/// Remainder of `line` after skipping `count` whitespace-separated fields,
/// with inner spacing preserved
fn text_after_fields(line: &str, count: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..count {
        rest = match rest.find(char::is_whitespace) {
            Some(end) => rest[end..].trim_start(),
            None => "",
        };
    }
    rest.trim_end()
}

impl fmt::Display for RaceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = time_codec::format_timestamp(self.time);
        let id = &self.competitor_id;
        match &self.kind {
            EventKind::Registered => write!(f, "[{}] The competitor({}) registered", time, id),
            EventKind::StartTimeDrawn(start) => write!(
                f,
                "[{}] The start time for the competitor({}) was set by a draw to {}",
                time,
                id,
                time_codec::format_timestamp(*start)
            ),
            EventKind::OnStartLine => {
                write!(f, "[{}] The competitor({}) is on the start line", time, id)
            }
            EventKind::Started => write!(f, "[{}] The competitor({}) has started", time, id),
            EventKind::OnFiringRange(range) => write!(
                f,
                "[{}] The competitor({}) is on the firing range({})",
                time, id, range
            ),
            EventKind::TargetHit(target) => write!(
                f,
                "[{}] The target({}) has been hit by competitor({})",
                time, target, id
            ),
            EventKind::LeftFiringRange => {
                write!(f, "[{}] The competitor({}) left the firing range", time, id)
            }
            EventKind::EnteredPenaltyLaps => {
                write!(f, "[{}] The competitor({}) entered the penalty laps", time, id)
            }
            EventKind::LeftPenaltyLaps => {
                write!(f, "[{}] The competitor({}) left the penalty laps", time, id)
            }
            EventKind::LapCompleted => {
                write!(f, "[{}] The competitor({}) ended the main lap", time, id)
            }
            EventKind::CannotContinue(reason) => write!(
                f,
                "[{}] The competitor({}) can`t continue: {}",
                time, id, reason
            ),
            EventKind::Unrecognized(code) => write!(
                f,
                "[{}] Unrecognized event {} for competitor({})",
                time, code, id
            ),
        }
    }
}
