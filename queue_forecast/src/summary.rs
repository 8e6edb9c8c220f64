//! Summary (index) table parsing
//!
//! The summary worksheet lists one row per served day: the daily sheet name,
//! the visit date it covers, how many people entered and the last identifier
//! served. Columns are located by header name, never by fixed offset.

use crate::error::{QueueForecastError, Result};
use crate::snapshot::Grid;
use chrono::NaiveDate;
use queue_math::ident;

/// Sheet-name / visit-date format used throughout the workbook.
pub const SHEET_DATE_FORMAT: &str = "%d.%m.%Y";

const COL_SHEET: &str = "Аркуш";
const COL_VISIT_DATE: &str = "Дата прийому";
const COL_ENTERED: &str = "Зайшов";
const COL_LAST_ENTERED: &str = "Останній номер що зайшов";

/// One row of the summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// Daily sheet name, usually a dd.mm.yyyy date
    pub sheet_name: String,
    /// Calendar date of the visit the sheet covers
    pub visit_date: Option<NaiveDate>,
    /// How many people entered that day
    pub entered_count: Option<u32>,
    /// Numeric value of the last identifier served that day
    pub last_entered_id: Option<f64>,
}

/// The parsed summary table, rows in sheet order (oldest first).
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Parse a raw summary grid. The first row must carry the column headers.
    pub fn parse(grid: &Grid) -> Result<Self> {
        let header = grid.first().ok_or_else(|| {
            QueueForecastError::DataError("Empty summary table".to_string())
        })?;

        let col = |name: &str| header.iter().position(|c| c.trim() == name);
        let sheet_idx = col(COL_SHEET).ok_or_else(|| missing_column(COL_SHEET))?;
        let entered_idx = col(COL_ENTERED).ok_or_else(|| missing_column(COL_ENTERED))?;
        let visit_idx = col(COL_VISIT_DATE);
        let last_idx = col(COL_LAST_ENTERED);

        let mut rows = Vec::with_capacity(grid.len().saturating_sub(1));
        for raw in &grid[1..] {
            let cell = |idx: Option<usize>| -> &str {
                idx.and_then(|i| raw.get(i)).map(|c| c.trim()).unwrap_or("")
            };

            let sheet_name = cell(Some(sheet_idx)).to_string();
            if sheet_name.is_empty() {
                continue;
            }

            rows.push(SummaryRow {
                sheet_name,
                visit_date: parse_sheet_name(cell(visit_idx)),
                entered_count: cell(Some(entered_idx)).parse().ok(),
                last_entered_id: ident::to_numeric(cell(last_idx)),
            });
        }

        Ok(Self { rows })
    }

    /// Sheets that recorded at least one entered person, as
    /// (sheet name, sheet date) pairs. Sheets whose name is not a date are
    /// not downloadable and are dropped here.
    pub fn sheets_with_attendance(&self) -> Vec<(String, NaiveDate)> {
        self.rows
            .iter()
            .filter(|r| r.entered_count.is_some())
            .filter_map(|r| {
                parse_sheet_name(&r.sheet_name).map(|date| (r.sheet_name.clone(), date))
            })
            .collect()
    }

    /// Visit date for a given sheet name, if listed.
    pub fn visit_date_for_sheet(&self, sheet_name: &str) -> Option<NaiveDate> {
        self.rows
            .iter()
            .find(|r| r.sheet_name == sheet_name)
            .and_then(|r| r.visit_date)
    }

    /// Highest "last identifier served" figure across all rows.
    pub fn max_last_entered(&self) -> Option<f64> {
        self.rows
            .iter()
            .filter_map(|r| r.last_entered_id)
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// The most recent `window` positive entered counts, oldest first.
    pub fn recent_entered_counts(&self, window: usize) -> Vec<u32> {
        let counts: Vec<u32> = self
            .rows
            .iter()
            .filter_map(|r| r.entered_count)
            .filter(|&c| c > 0)
            .collect();
        let start = counts.len().saturating_sub(window);
        counts[start..].to_vec()
    }
}

/// Parse a dd.mm.yyyy sheet name into a date.
pub fn parse_sheet_name(name: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(name.trim(), SHEET_DATE_FORMAT).ok()
}

fn missing_column(name: &str) -> QueueForecastError {
    QueueForecastError::DataError(format!("Summary table has no '{name}' column"))
}
