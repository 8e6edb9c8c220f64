//! Daily attendance snapshot parsing
//!
//! Each served day is exported as a loose grid of text cells: free-text
//! banners on top, then a header row whose first cell is the `№` position
//! marker, then one row per queue position. Rows that do not look like a
//! queue entry are expected noise, so they are collected as skip reasons
//! rather than raised as errors.

use crate::error::{QueueForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A raw grid of text cells, as exported from the spreadsheet.
pub type Grid = Vec<Vec<String>>;

/// Header sentinel: the position-number column marker.
const HEADER_SENTINEL: &str = "№";

/// Outcome recorded for one queue position on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// Entered via the scheduled list
    Entered,
    /// Entered via the live (walk-in) queue
    EnteredLiveQueue,
    /// Called but did not enter
    NotEntered,
    /// Did not show up at all
    NoShow,
    /// Postponed their visit
    Postponed,
    /// Anything else
    Unknown,
}

impl AttendanceStatus {
    /// Classify a free-text status cell.
    ///
    /// Matching is substring-based and case-insensitive. Negation markers
    /// are checked before the plain "entered" marker, because every negated
    /// phrase still contains it.
    pub fn classify(raw: &str) -> Self {
        // The sheets mix typographic and ASCII apostrophes
        let s = raw.to_lowercase().replace('\u{2019}', "'");
        if s.contains("не з'явився") {
            AttendanceStatus::NoShow
        } else if s.contains("не зайшов") {
            AttendanceStatus::NotEntered
        } else if s.contains("відклав") {
            AttendanceStatus::Postponed
        } else if s.contains("зайшов") {
            if s.contains("за живою чергою") {
                AttendanceStatus::EnteredLiveQueue
            } else {
                AttendanceStatus::Entered
            }
        } else {
            AttendanceStatus::Unknown
        }
    }

    /// True for statuses that mean the person was actually served.
    pub fn is_entered(self) -> bool {
        matches!(
            self,
            AttendanceStatus::Entered | AttendanceStatus::EnteredLiveQueue
        )
    }
}

/// One parsed row of a daily snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    /// Calendar date the snapshot covers
    pub sheet_date: NaiveDate,
    /// 1-based rank within that day's processing order
    pub position: u32,
    /// Raw two-part identifier, e.g. "4355" or "4355/1"
    pub identifier: String,
    /// Classified outcome
    pub status: AttendanceStatus,
}

/// Why a grid row was not turned into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than three cells
    TooShort,
    /// Position cell is empty or not purely numeric
    NonNumericPosition,
    /// Identifier cell carries no digits at all
    BlankIdentifier,
}

/// A skipped row together with its zero-based grid index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: SkipReason,
}

/// Result of parsing one day's snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSnapshot {
    pub records: Vec<AttendanceRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Parse one day's raw grid into attendance records.
///
/// The header row is located by scanning for the `№` sentinel instead of
/// assuming a fixed offset; a grid without it is not a snapshot at all and
/// yields a data error.
pub fn parse_snapshot(sheet_date: NaiveDate, grid: &Grid) -> Result<ParsedSnapshot> {
    let header_idx = grid
        .iter()
        .position(|row| row.first().map(|c| c.trim()) == Some(HEADER_SENTINEL))
        .ok_or_else(|| {
            QueueForecastError::DataError(format!(
                "No '{HEADER_SENTINEL}' header row in snapshot for {sheet_date}"
            ))
        })?;

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (idx, row) in grid.iter().enumerate().skip(header_idx + 1) {
        if row.len() < 3 {
            skipped.push(SkippedRow {
                row: idx,
                reason: SkipReason::TooShort,
            });
            continue;
        }

        let position_cell = row[0].trim();
        if position_cell.is_empty() || !position_cell.chars().all(|c| c.is_ascii_digit()) {
            skipped.push(SkippedRow {
                row: idx,
                reason: SkipReason::NonNumericPosition,
            });
            continue;
        }
        let position: u32 = match position_cell.parse() {
            Ok(p) if p > 0 => p,
            _ => {
                skipped.push(SkippedRow {
                    row: idx,
                    reason: SkipReason::NonNumericPosition,
                });
                continue;
            }
        };

        let identifier = row[1].trim();
        if !identifier.chars().any(|c| c.is_ascii_digit()) {
            skipped.push(SkippedRow {
                row: idx,
                reason: SkipReason::BlankIdentifier,
            });
            continue;
        }

        records.push(AttendanceRecord {
            sheet_date,
            position,
            identifier: identifier.to_string(),
            status: AttendanceStatus::classify(row[2].trim()),
        });
    }

    Ok(ParsedSnapshot { records, skipped })
}
