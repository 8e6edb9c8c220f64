//! Per-day statistics and aggregate throughput metrics
//!
//! A separate, non-probabilistic summarization of the daily snapshots used
//! for capacity estimates and the coarse entry-probability fallback. The
//! regression never reads these figures.

use crate::snapshot::{AttendanceRecord, AttendanceStatus};
use crate::summary::SummaryTable;
use chrono::NaiveDate;

/// Default look-back window for the coarse entry-probability fallback.
pub const RECENT_DAYS_WINDOW: usize = 10;

/// What happened on one served day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStats {
    pub date: NaiveDate,
    /// Highest scheduled position that actually entered
    pub positions_processed: u32,
    /// People who entered via the scheduled list
    pub entered: u32,
    /// People who entered via the live queue
    pub entered_live: u32,
    /// No-shows among positions below the last entered one
    pub no_show: u32,
    /// Postponed visits
    pub postponed: u32,
    /// Identifier of the last scheduled person served, if any
    pub last_entered_id: Option<String>,
}

impl DayStats {
    /// Summarize one day's parsed records; `None` for an empty day.
    pub fn from_records(date: NaiveDate, records: &[AttendanceRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let last_entered = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Entered)
            .max_by_key(|r| r.position);
        let last_entered_pos = last_entered.map_or(0, |r| r.position);

        let mut entered = 0;
        let mut entered_live = 0;
        let mut no_show = 0;
        let mut postponed = 0;
        for record in records {
            match record.status {
                AttendanceStatus::Entered => entered += 1,
                AttendanceStatus::EnteredLiveQueue => entered_live += 1,
                AttendanceStatus::NoShow if record.position < last_entered_pos => no_show += 1,
                AttendanceStatus::Postponed => postponed += 1,
                _ => {}
            }
        }

        Some(Self {
            date,
            positions_processed: last_entered_pos,
            entered,
            entered_live,
            no_show,
            postponed,
            last_entered_id: last_entered.map(|r| r.identifier.clone()),
        })
    }
}

/// Aggregate throughput metrics across many days.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub avg_positions_processed: f64,
    pub std_positions_processed: f64,
    pub avg_entered: f64,
    pub avg_live_entries: f64,
    /// No-shows over positions that should have entered, across all days
    pub no_show_rate: f64,
    pub total_days: usize,
    pub min_positions: u32,
    pub max_positions: u32,
}

/// Aggregate day statistics into throughput metrics; `None` without data.
pub fn calculate_metrics(stats: &[DayStats]) -> Option<Metrics> {
    if stats.is_empty() {
        return None;
    }

    let positions: Vec<f64> = stats.iter().map(|s| s.positions_processed as f64).collect();
    let total_should_enter: u32 = stats.iter().map(|s| s.positions_processed).sum();
    let total_no_show: u32 = stats.iter().map(|s| s.no_show).sum();

    Some(Metrics {
        avg_positions_processed: mean(&positions),
        std_positions_processed: sample_std_dev(&positions),
        avg_entered: mean(&stats.iter().map(|s| s.entered as f64).collect::<Vec<_>>()),
        avg_live_entries: mean(&stats.iter().map(|s| s.entered_live as f64).collect::<Vec<_>>()),
        no_show_rate: if total_should_enter > 0 {
            total_no_show as f64 / total_should_enter as f64
        } else {
            0.0
        },
        total_days: stats.len(),
        min_positions: stats.iter().map(|s| s.positions_processed).min().unwrap_or(0),
        max_positions: stats.iter().map(|s| s.positions_processed).max().unwrap_or(0),
    })
}

impl std::fmt::Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Queue Throughput Metrics:")?;
        writeln!(f, "  Days observed:        {}", self.total_days)?;
        writeln!(
            f,
            "  Positions per day:    {:.1} +/- {:.1} (min {}, max {})",
            self.avg_positions_processed,
            self.std_positions_processed,
            self.min_positions,
            self.max_positions
        )?;
        writeln!(f, "  Entered per day:      {:.1}", self.avg_entered)?;
        writeln!(f, "  Live entries per day: {:.1}", self.avg_live_entries)?;
        writeln!(f, "  No-show rate:         {:.1}%", self.no_show_rate * 100.0)?;
        Ok(())
    }
}

/// Coarse probability, in percent, that a given rank in tomorrow's list is
/// reached, looking back over the default window. Used when the regression
/// has too little data.
pub fn rank_entry_probability(summary: &SummaryTable, rank: u32) -> f64 {
    rank_entry_probability_within(summary, rank, RECENT_DAYS_WINDOW)
}

/// Same as [`rank_entry_probability`] with an explicit look-back window:
/// the share of the last `window` non-zero entered counts that reached
/// `rank`.
pub fn rank_entry_probability_within(summary: &SummaryTable, rank: u32, window: usize) -> f64 {
    let counts = summary.recent_entered_counts(window);
    if counts.is_empty() {
        return 0.0;
    }
    let covered = counts.iter().filter(|&&c| c >= rank).count();
    covered as f64 / counts.len() as f64 * 100.0
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
