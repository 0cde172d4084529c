//! Competitor state tracking
//!
//! One `CompetitorState` exists per registered competitor. It is mutated only
//! by the event processor and read by the report builder.

use crate::types::{Duration, Timestamp};

/// Where a competitor stands once the feed has been processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Standing {
    Finished,
    /// Still on the course, or never showed up
    NotFinished,
    Disqualified,
}

/// Accumulated race facts for one competitor
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitorState {
    pub competitor_id: String,
    pub scheduled_start: Option<Timestamp>,
    pub actual_start: Option<Timestamp>,
    pub actual_finish: Option<Timestamp>,
    /// Entry time of the current penalty-lap cycle
    pub penalty_entry_time: Option<Timestamp>,
    pub total_penalty_duration: Duration,
    pub lap_completion_times: Vec<Timestamp>,
    pub firing_range_visits: u32,
    pub hits: u32,
    /// Penalty laps owed since the last firing-range entry. Not clamped.
    pub outstanding_penalty_laps: i64,
    pub completed_penalty_laps: i64,
    pub is_finished: bool,
    pub is_disqualified: bool,
}

impl CompetitorState {
    pub fn new(competitor_id: impl Into<String>) -> Self {
        Self {
            competitor_id: competitor_id.into(),
            scheduled_start: None,
            actual_start: None,
            actual_finish: None,
            penalty_entry_time: None,
            total_penalty_duration: Duration::zero(),
            lap_completion_times: Vec::new(),
            firing_range_visits: 0,
            hits: 0,
            outstanding_penalty_laps: 0,
            completed_penalty_laps: 0,
            is_finished: false,
            is_disqualified: false,
        }
    }

    pub fn standing(&self) -> Standing {
        if self.is_finished {
            Standing::Finished
        } else if self.is_disqualified {
            Standing::Disqualified
        } else {
            Standing::NotFinished
        }
    }

    /// Number of main laps completed so far
    pub fn laps_completed(&self) -> usize {
        self.lap_completion_times.len()
    }

    /// Time from scheduled start to finish, if the competitor finished
    pub fn elapsed(&self) -> Option<Duration> {
        let finish = self.actual_finish?;
        let start = self
            .scheduled_start
            .unwrap_or(crate::time_codec::REFERENCE_EPOCH);
        Some(finish.signed_duration_since(start))
    }

    /// Check whether the disqualification sweep may still disqualify this competitor
    pub fn awaits_start(&self) -> bool {
        self.scheduled_start.is_some()
            && self.actual_start.is_none()
            && !self.is_disqualified
            && !self.is_finished
    }
}
