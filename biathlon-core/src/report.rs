//! Results table generation
//!
//! Ranks competitors and renders one row per competitor:
//!
//! ```text
//! [totalTime] competitorId [{lapTime, lapSpeed}, ...] {penaltyTime, penaltySpeed} hits/shots
//! ```
//!
//! For example `[NotFinished] 1 [{00:29:03.872, 2.093}, {,}] {00:01:44.296, 0.481} 4/5`.
//! Missing or zero-length measurements render as the empty pair `{,}`.

use crate::config::RaceConfig;
use crate::processor::Statistics;
use crate::state::{CompetitorState, Standing};
use crate::time_codec::format_duration;
use crate::types::{Duration, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const EMPTY_PAIR: &str = "{,}";

/// Builds the results table from final competitor statistics
pub struct ReportBuilder<'a> {
    config: &'a RaceConfig,
    competitors: &'a Statistics,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(config: &'a RaceConfig, competitors: &'a Statistics) -> Self {
        Self {
            config,
            competitors,
        }
    }

    /// Rank competitors: finished by elapsed time, then still racing by id,
    /// then disqualified by id
    pub fn sort(&self) -> Vec<&'a CompetitorState> {
        let mut ranked: Vec<&CompetitorState> = self.competitors.values().collect();
        ranked.sort_by(|a, b| {
            a.standing().cmp(&b.standing()).then_with(|| match a.standing() {
                Standing::Finished => a.elapsed().cmp(&b.elapsed()),
                Standing::NotFinished | Standing::Disqualified => {
                    a.competitor_id.cmp(&b.competitor_id)
                }
            })
        });
        ranked
    }

    /// Render one results row
    pub fn render_row(&self, state: &CompetitorState) -> String {
        format!(
            "[{}] {} [{}] {} {}",
            total_time(state),
            state.competitor_id,
            lap_summary(state, self.config),
            penalty_summary(state, self.config),
            hit_summary(state)
        )
    }

    /// All rows in ranking order
    pub fn rows(&self) -> Vec<String> {
        self.sort()
            .into_iter()
            .map(|state| self.render_row(state))
            .collect()
    }

    /// Write the table, one newline-terminated row per competitor
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = BufWriter::new(writer);
        for row in self.rows() {
            writeln!(writer, "{}", row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Create (or truncate) `path` and write the table into it
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)?;
        log::info!(
            "Wrote {} result row(s) to {:?}",
            self.competitors.len(),
            path
        );
        Ok(())
    }
}

/// Total time label: `NotStarted`, `NotFinished`, or scheduled-start-to-finish time
pub fn total_time(state: &CompetitorState) -> String {
    if state.is_disqualified {
        return "NotStarted".to_string();
    }
    match state.elapsed() {
        Some(elapsed) if state.is_finished => format_duration(elapsed),
        _ => "NotFinished".to_string(),
    }
}

/// `{time, speed}` pairs for every configured lap, joined with `", "`
pub fn lap_summary(state: &CompetitorState, config: &RaceConfig) -> String {
    let distance = f64::from(config.lap_length);
    let times = &state.lap_completion_times;

    (0..config.laps as usize)
        .map(|lap| {
            let Some(done) = times.get(lap) else {
                return EMPTY_PAIR.to_string();
            };
            let previous = if lap == 0 {
                state.actual_start
            } else {
                Some(times[lap - 1])
            };
            match previous {
                Some(previous) => timed_pair(done.signed_duration_since(previous), distance),
                None => EMPTY_PAIR.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Aggregate `{time, speed}` pair over all penalty laps.
///
/// Speed is `penalty length * completed laps * 1000 / total milliseconds`.
pub fn penalty_summary(state: &CompetitorState, config: &RaceConfig) -> String {
    let millis = state.total_penalty_duration.num_milliseconds();
    if millis == 0 {
        return EMPTY_PAIR.to_string();
    }
    let distance = f64::from(config.penalty_lap_length) * state.completed_penalty_laps as f64 * 1000.0;
    let speed = distance / millis as f64;
    format!(
        "{{{}, {:.3}}}",
        format_duration(state.total_penalty_duration),
        speed
    )
}

/// `hits/shots`, counting a fixed number of shots per firing-range visit
pub fn hit_summary(state: &CompetitorState) -> String {
    format!(
        "{}/{}",
        state.hits,
        RaceConfig::shots_for_visits(state.firing_range_visits)
    )
}

fn timed_pair(elapsed: Duration, distance: f64) -> String {
    let millis = elapsed.num_milliseconds();
    if millis == 0 {
        return EMPTY_PAIR.to_string();
    }
    let speed = distance / (millis as f64 / 1000.0);
    format!("{{{}, {:.3}}}", format_duration(elapsed), speed)
}
