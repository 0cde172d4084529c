//! Event processor
//!
//! Folds the ordered event feed into one `CompetitorState` per competitor.
//! The processor exclusively owns the competitor map while the feed is being
//! processed and hands it over once the whole feed has been applied. Any
//! failure aborts the pass and no statistics are returned.
//!
//! Every applied event produces at least one audit line, delivered to an
//! [`AuditSink`] in feed order.

use crate::config::{RaceConfig, SHOTS_PER_VISIT};
use crate::events::{codes, EventKind, RaceEvent};
use crate::state::CompetitorState;
use crate::time_codec::{self, timestamp_to_duration};
use crate::types::{Duration, RaceError, Result, Timestamp};
use std::collections::BTreeMap;
use std::io::BufRead;

/// Competitor id → accumulated state
pub type Statistics = BTreeMap<String, CompetitorState>;

/// Receiver of the human-readable audit stream
pub trait AuditSink {
    fn emit(&mut self, line: &str);
}

impl AuditSink for Vec<String> {
    fn emit(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Prints audit lines to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutAudit;

impl AuditSink for StdoutAudit {
    fn emit(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Applies feed events to the competitor map
pub struct EventProcessor {
    config: RaceConfig,
    start_interval: Duration,
    competitors: Statistics,
    events_applied: usize,
}

impl EventProcessor {
    /// Create a processor for one race.
    ///
    /// Fails with `ConfigParseError` if the configuration has no laps or if
    /// the start time or the start interval cannot be parsed.
    pub fn new(config: RaceConfig) -> Result<Self> {
        config.validate()?;
        let start_interval = config.start_interval()?;
        let race_start = config.race_start()?;
        log::info!(
            "Race starts at {} with {} lap(s), start interval {}",
            time_codec::format_timestamp(race_start),
            config.laps,
            time_codec::format_duration(start_interval)
        );

        Ok(Self {
            config,
            start_interval,
            competitors: Statistics::new(),
            events_applied: 0,
        })
    }

    /// Current competitor map
    pub fn competitors(&self) -> &Statistics {
        &self.competitors
    }

    /// Hand over the competitor map
    pub fn into_competitors(self) -> Statistics {
        self.competitors
    }

    /// Process a whole feed and return the final statistics
    pub fn process_reader<R: BufRead>(
        mut self,
        reader: R,
        audit: &mut dyn AuditSink,
    ) -> Result<Statistics> {
        for line in reader.lines() {
            let line = line?;
            self.process_line(&line, audit)?;
        }

        log::info!(
            "Processed {} event(s) for {} competitor(s)",
            self.events_applied,
            self.competitors.len()
        );
        Ok(self.competitors)
    }

    /// Parse and apply a single feed line
    pub fn process_line(&mut self, line: &str, audit: &mut dyn AuditSink) -> Result<()> {
        let event = RaceEvent::parse(line)?;
        self.apply(&event, audit)
    }

    /// Apply one parsed event
    pub fn apply(&mut self, event: &RaceEvent, audit: &mut dyn AuditSink) -> Result<()> {
        let id = event.competitor_id.as_str();

        match &event.kind {
            EventKind::Unrecognized(code) => {
                log::warn!("Skipping unrecognized event code {} for competitor {}", code, id);
                return Ok(());
            }
            EventKind::Registered => {
                if self.competitors.contains_key(id) {
                    return Err(RaceError::DuplicateRegistration(id.to_string()));
                }
                self.competitors
                    .insert(id.to_string(), CompetitorState::new(id));
                log::debug!("Registered competitor {}", id);
                audit.emit(&event.to_string());
                self.events_applied += 1;
                return Ok(());
            }
            _ => {}
        }

        let laps = self.config.laps as usize;
        let state = self
            .competitors
            .get_mut(id)
            .ok_or_else(|| RaceError::UnknownCompetitor(id.to_string()))?;

        let mut finished_now = false;
        match &event.kind {
            EventKind::StartTimeDrawn(start) => {
                state.scheduled_start = Some(*start);
            }
            EventKind::Started => {
                if state.is_disqualified {
                    log::warn!("Ignoring start of disqualified competitor {}", id);
                } else {
                    state.actual_start = Some(event.time);
                }
            }
            EventKind::OnFiringRange(range) => {
                if let Ok(line_no) = range.parse::<u32>() {
                    if !self.config.is_known_firing_line(line_no) {
                        log::warn!(
                            "Competitor {} entered firing range {} but only {} are configured",
                            id,
                            line_no,
                            self.config.firing_lines
                        );
                    }
                }
                state.firing_range_visits += 1;
                state.outstanding_penalty_laps = i64::from(SHOTS_PER_VISIT);
            }
            EventKind::TargetHit(_) => {
                state.hits += 1;
                state.outstanding_penalty_laps -= 1;
            }
            EventKind::EnteredPenaltyLaps => {
                state.penalty_entry_time = Some(event.time);
            }
            EventKind::LeftPenaltyLaps => {
                state.completed_penalty_laps += state.outstanding_penalty_laps;
                match state.penalty_entry_time {
                    Some(entry) => {
                        state.total_penalty_duration =
                            state.total_penalty_duration + event.time.signed_duration_since(entry);
                    }
                    None => log::warn!(
                        "Competitor {} left the penalty laps without entering them",
                        id
                    ),
                }
            }
            EventKind::LapCompleted => {
                if state.is_disqualified || state.is_finished || state.laps_completed() >= laps {
                    log::warn!("Ignoring lap completion for competitor {} after race end", id);
                } else {
                    state.lap_completion_times.push(event.time);
                    if state.laps_completed() == laps {
                        state.is_finished = true;
                        state.actual_finish = Some(event.time);
                        finished_now = true;
                    }
                }
            }
            // Audit only; registration and unrecognized codes returned early
            EventKind::OnStartLine
            | EventKind::LeftFiringRange
            | EventKind::CannotContinue(_)
            | EventKind::Registered
            | EventKind::Unrecognized(_) => {}
        }
        log::debug!("Applied {:?} to competitor {}", event.kind, id);

        if matches!(event.kind, EventKind::Started) {
            for disqualified in
                disqualification_sweep(&mut self.competitors, event.time, self.start_interval)
            {
                log::debug!(
                    "Outgoing event {}: competitor {} disqualified",
                    codes::DISQUALIFIED,
                    disqualified
                );
                audit.emit(&format!(
                    "[{}] The competitor({}) is disqualified",
                    time_codec::format_timestamp(event.time),
                    disqualified
                ));
            }
        }

        if finished_now {
            log::debug!("Outgoing event {}: competitor {} finished", codes::FINISHED, id);
            audit.emit(&format!(
                "[{}] The competitor({}) has finished",
                time_codec::format_timestamp(event.time),
                id
            ));
        } else {
            audit.emit(&event.to_string());
        }

        self.events_applied += 1;
        Ok(())
    }
}

/// Disqualify every competitor that missed its start window.
///
/// A competitor with a scheduled start, no actual start and no terminal flag
/// is disqualified when `now` is strictly after `scheduled_start + interval`.
/// Scans the whole map; returns the ids disqualified by this sweep.
pub fn disqualification_sweep(
    competitors: &mut Statistics,
    now: Timestamp,
    interval: Duration,
) -> Vec<String> {
    let now = timestamp_to_duration(now);
    let mut disqualified = Vec::new();

    for (id, state) in competitors.iter_mut() {
        if !state.awaits_start() {
            continue;
        }
        let Some(scheduled) = state.scheduled_start else {
            continue;
        };
        if now > timestamp_to_duration(scheduled) + interval {
            state.is_disqualified = true;
            disqualified.push(id.clone());
        }
    }

    disqualified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_codec::parse_timestamp;

    fn ts(text: &str) -> Timestamp {
        parse_timestamp(text).unwrap()
    }

    fn processor(laps: u32) -> EventProcessor {
        let config = RaceConfig::new()
            .with_laps(laps)
            .with_start("10:00:00.000")
            .with_start_delta("00:03:00");
        EventProcessor::new(config).unwrap()
    }

    fn feed(processor: &mut EventProcessor, lines: &[&str]) -> Vec<String> {
        let mut audit = Vec::new();
        for line in lines {
            processor.process_line(line, &mut audit).unwrap();
        }
        audit
    }

    fn scheduled(id: &str, start: &str) -> (String, CompetitorState) {
        let mut state = CompetitorState::new(id);
        state.scheduled_start = Some(ts(start));
        (id.to_string(), state)
    }

    #[test]
    fn test_sweep_disqualifies_late_competitor() {
        let mut competitors: Statistics = [scheduled("1", "10:00:00.000")].into_iter().collect();
        let hit = disqualification_sweep(&mut competitors, ts("10:05:00.000"), Duration::minutes(3));
        assert_eq!(hit, vec!["1".to_string()]);
        assert!(competitors["1"].is_disqualified);
    }

    #[test]
    fn test_sweep_spares_competitor_within_window() {
        let mut competitors: Statistics = [scheduled("1", "10:00:00.000")].into_iter().collect();
        let hit = disqualification_sweep(&mut competitors, ts("10:02:00.000"), Duration::minutes(3));
        assert!(hit.is_empty());
        assert!(!competitors["1"].is_disqualified);
    }

    #[test]
    fn test_sweep_deadline_is_exclusive() {
        let mut competitors: Statistics = [scheduled("1", "10:00:00.000")].into_iter().collect();
        disqualification_sweep(&mut competitors, ts("10:03:00.000"), Duration::minutes(3));
        assert!(!competitors["1"].is_disqualified);
    }

    #[test]
    fn test_sweep_skips_started_and_unscheduled() {
        let (_, mut started) = scheduled("1", "10:00:00.000");
        started.actual_start = Some(ts("10:01:00.000"));
        let unscheduled = CompetitorState::new("2");
        let mut competitors: Statistics = [("1".to_string(), started), ("2".to_string(), unscheduled)]
            .into_iter()
            .collect();

        let hit = disqualification_sweep(&mut competitors, ts("10:05:00.000"), Duration::minutes(3));
        assert!(hit.is_empty());
        assert!(!competitors["1"].is_disqualified);
        assert!(!competitors["2"].is_disqualified);
    }

    #[test]
    fn test_sweep_leaves_already_disqualified_alone() {
        let (_, mut state) = scheduled("1", "10:00:00.000");
        state.is_disqualified = true;
        let mut competitors: Statistics = [("1".to_string(), state)].into_iter().collect();
        let hit = disqualification_sweep(&mut competitors, ts("10:05:00.000"), Duration::minutes(3));
        assert!(hit.is_empty());
        assert!(competitors["1"].is_disqualified);
    }

    #[test]
    fn test_start_of_other_competitor_triggers_sweep() {
        let mut p = processor(1);
        let audit = feed(
            &mut p,
            &[
                "[09:00:00.000] 1 1",
                "[09:00:01.000] 1 2",
                "[09:10:00.000] 2 1 10:00:00.000",
                "[09:10:01.000] 2 2 10:04:00.000",
                "[10:05:00.000] 4 2",
            ],
        );

        assert!(p.competitors()["1"].is_disqualified);
        assert!(!p.competitors()["2"].is_disqualified);
        assert_eq!(
            &audit[4..],
            &[
                "[10:05:00.000] The competitor(1) is disqualified".to_string(),
                "[10:05:00.000] The competitor(2) has started".to_string(),
            ]
        );
    }

    #[test]
    fn test_disqualified_competitor_cannot_start_or_finish() {
        let mut p = processor(1);
        feed(
            &mut p,
            &[
                "[09:00:00.000] 1 1",
                "[09:00:01.000] 1 2",
                "[09:10:00.000] 2 1 10:00:00.000",
                "[10:05:00.000] 4 2",
                "[10:06:00.000] 4 1",
                "[10:30:00.000] 10 1",
            ],
        );

        let state = &p.competitors()["1"];
        assert!(state.is_disqualified);
        assert!(!state.is_finished);
        assert!(state.actual_start.is_none());
        assert!(state.lap_completion_times.is_empty());
    }

    #[test]
    fn test_firing_range_and_penalty_laps() {
        let mut p = processor(2);
        feed(
            &mut p,
            &[
                "[09:00:00.000] 1 1",
                "[10:10:00.000] 5 1 1",
                "[10:10:01.000] 6 1 1",
                "[10:10:02.000] 6 1 2",
                "[10:10:03.000] 6 1 3",
                "[10:10:04.000] 7 1",
                "[10:10:10.000] 8 1",
                "[10:11:10.000] 9 1",
                "[10:20:00.000] 5 1 1",
                "[10:20:01.000] 6 1 1",
                "[10:20:05.000] 8 1",
                "[10:21:35.500] 9 1",
            ],
        );

        let state = &p.competitors()["1"];
        assert_eq!(state.firing_range_visits, 2);
        assert_eq!(state.hits, 4);
        assert_eq!(state.outstanding_penalty_laps, 4);
        assert_eq!(state.completed_penalty_laps, 6);
        assert_eq!(state.total_penalty_duration, Duration::milliseconds(150_500));
    }

    #[test]
    fn test_outstanding_penalty_laps_are_not_clamped() {
        let mut p = processor(1);
        let mut lines = vec!["[09:00:00.000] 1 1", "[10:10:00.000] 5 1 1"];
        lines.extend(std::iter::repeat("[10:10:01.000] 6 1 1").take(7));
        feed(&mut p, &lines);
        assert_eq!(p.competitors()["1"].outstanding_penalty_laps, -2);
    }

    #[test]
    fn test_finishes_on_final_lap() {
        let mut p = processor(2);
        let audit = feed(
            &mut p,
            &[
                "[09:00:00.000] 1 1",
                "[09:10:00.000] 2 1 10:00:00.000",
                "[10:00:01.000] 4 1",
                "[10:15:00.000] 10 1",
                "[10:30:00.000] 10 1",
                "[10:31:00.000] 10 1",
            ],
        );

        let state = &p.competitors()["1"];
        assert!(state.is_finished);
        assert!(!state.is_disqualified);
        assert_eq!(state.actual_finish, Some(ts("10:30:00.000")));
        assert_eq!(state.laps_completed(), 2);
        assert_eq!(audit[3], "[10:15:00.000] The competitor(1) ended the main lap");
        assert_eq!(audit[4], "[10:30:00.000] The competitor(1) has finished");
    }

    #[test]
    fn test_finished_competitor_is_not_disqualified_later() {
        let mut p = processor(1);
        feed(
            &mut p,
            &[
                "[09:00:00.000] 1 1",
                "[09:00:00.000] 1 2",
                "[09:10:00.000] 2 1 10:00:00.000",
                "[10:02:00.000] 10 1",
                "[10:30:00.000] 4 2",
            ],
        );
        let state = &p.competitors()["1"];
        assert!(state.is_finished);
        assert!(!state.is_disqualified);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut p = processor(1);
        let mut audit: Vec<String> = Vec::new();
        p.process_line("[09:00:00.000] 1 1", &mut audit).unwrap();
        let err = p.process_line("[09:00:01.000] 1 1", &mut audit).unwrap_err();
        assert!(matches!(err, RaceError::DuplicateRegistration(id) if id == "1"));
    }

    #[test]
    fn test_unknown_competitor_fails() {
        let mut p = processor(1);
        let err = p
            .process_line("[09:00:00.000] 4 42", &mut Vec::<String>::new())
            .unwrap_err();
        assert!(matches!(err, RaceError::UnknownCompetitor(id) if id == "42"));
    }

    #[test]
    fn test_unrecognized_code_is_skipped() {
        let mut p = processor(1);
        let audit = feed(&mut p, &["[09:00:00.000] 77 1"]);
        assert!(audit.is_empty());
        assert!(p.competitors().is_empty());
    }

    #[test]
    fn test_invalid_start_delta_fails_construction() {
        let config = RaceConfig::new().with_start_delta("later");
        assert!(matches!(
            EventProcessor::new(config),
            Err(RaceError::ConfigParseError(_))
        ));
    }

    #[test]
    fn test_zero_lap_config_is_rejected() {
        let config = RaceConfig::new().with_laps(0);
        assert!(matches!(
            EventProcessor::new(config),
            Err(RaceError::ConfigParseError(_))
        ));
    }

    #[test]
    fn test_lap_count_never_exceeds_configured_laps() {
        let mut p = processor(1);
        feed(
            &mut p,
            &[
                "[09:00:00.000] 1 1",
                "[10:00:01.000] 4 1",
                "[10:15:00.000] 10 1",
                "[10:16:00.000] 10 1",
                "[10:17:00.000] 10 1",
            ],
        );
        let state = &p.competitors()["1"];
        assert_eq!(state.laps_completed(), 1);
        assert_eq!(state.actual_finish, Some(ts("10:15:00.000")));
    }

    #[test]
    fn test_process_reader_aborts_on_error() {
        let feed = "[09:00:00.000] 1 1\n[09:00:01.000] 4\n";
        let result = processor(1).process_reader(feed.as_bytes(), &mut Vec::<String>::new());
        assert!(matches!(result, Err(RaceError::MalformedEvent { .. })));
    }
}
