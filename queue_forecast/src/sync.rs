//! Snapshot synchronization and the local aggregation cache
//!
//! The upstream spreadsheet is the system of record; this module keeps a
//! local mirror of it. Daily grids land as one CSV file per date, the
//! summary table as `_summary.csv`, and the derived corpus as
//! `attendance.json`. A refresh pass re-fetches the most recent days
//! unconditionally (same-day administrative corrections are common), fetches
//! anything missing, and rebuilds the corpus when something changed. One
//! failing day never aborts the whole cycle.

use crate::corpus::{AttendanceCorpus, AttendancePoint, CorpusSource};
use crate::error::{QueueForecastError, Result};
use crate::snapshot::{parse_snapshot, Grid};
use crate::summary::{SummaryTable, SHEET_DATE_FORMAT};
use chrono::{Duration, NaiveDate};
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration as StdDuration;
use thiserror::Error;

const SUMMARY_FILE: &str = "_summary.csv";
const CORPUS_FILE: &str = "attendance.json";

/// Errors a sheet source can report for a single fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Per-minute quota exhausted; retry with backoff
    #[error("rate limited by the remote service")]
    RateLimited,
    /// The requested sheet does not exist
    #[error("sheet not found")]
    NotFound,
    /// Transient transport failure; retry with backoff
    #[error("network error: {0}")]
    Network(String),
    /// Any other remote failure; not worth retrying
    #[error("remote error: {0}")]
    Remote(String),
}

/// Result type for remote fetches.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// The narrow seam to the remote spreadsheet service.
pub trait SheetSource {
    /// Pull the summary (index) table.
    fn fetch_summary(&mut self) -> FetchResult<Grid>;

    /// Pull one day's raw grid by its sheet name (dd.mm.yyyy).
    fn fetch_daily_snapshot(&mut self, sheet_name: &str) -> FetchResult<Grid>;
}

/// Local directory cache of daily grids, the summary table and the corpus.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    /// Open (and create if needed) a cache directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.csv", date.format("%Y-%m-%d")))
    }

    /// Store one day's grid, overwriting any previous copy.
    pub fn store_snapshot(&self, date: NaiveDate, grid: &Grid) -> Result<()> {
        write_grid(&self.snapshot_path(date), grid)
    }

    /// Load one day's cached grid, if present.
    pub fn load_snapshot(&self, date: NaiveDate) -> Result<Option<Grid>> {
        read_grid(&self.snapshot_path(date))
    }

    pub fn has_snapshot(&self, date: NaiveDate) -> bool {
        self.snapshot_path(date).exists()
    }

    /// Dates of all cached daily snapshots, oldest first. Files whose name
    /// is not a date (the summary file included) are ignored.
    pub fn cached_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut dates = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".csv")) else {
                continue;
            };
            if let Ok(date) = NaiveDate::parse_from_str(stem, "%Y-%m-%d") {
                dates.push(date);
            }
        }
        dates.sort();
        Ok(dates)
    }

    pub fn store_summary(&self, grid: &Grid) -> Result<()> {
        write_grid(&self.dir.join(SUMMARY_FILE), grid)
    }

    pub fn load_summary(&self) -> Result<Option<Grid>> {
        read_grid(&self.dir.join(SUMMARY_FILE))
    }

    pub fn store_corpus(&self, corpus: &AttendanceCorpus) -> Result<()> {
        corpus.save_json(&self.dir.join(CORPUS_FILE))
    }

    pub fn load_corpus(&self) -> Result<Option<AttendanceCorpus>> {
        AttendanceCorpus::load_json(&self.dir.join(CORPUS_FILE))
    }
}

fn write_grid(path: &std::path::Path, grid: &Grid) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for row in grid {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_grid(path: &std::path::Path) -> Result<Option<Grid>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)?;
    let mut grid = Grid::new();
    for record in reader.records() {
        grid.push(record?.iter().map(str::to_string).collect());
    }
    Ok(Some(grid))
}

/// Tuning knobs for a refresh pass.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Days this recent are always re-fetched, cache or not
    pub refresh_recent_days: i64,
    /// Retry budget per day for rate-limit/network failures
    pub max_retries: u32,
    /// Base delay of the exponential backoff
    pub retry_base_delay: StdDuration,
    /// Pause between consecutive sheet fetches (quota avoidance)
    pub inter_request_delay: StdDuration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            refresh_recent_days: 5,
            max_retries: 3,
            retry_base_delay: StdDuration::from_millis(500),
            inter_request_delay: StdDuration::from_millis(300),
        }
    }
}

/// What a refresh pass actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Number of daily sheets downloaded
    pub downloaded: usize,
    /// Sheet names that failed after the retry budget and were skipped
    pub skipped_days: Vec<String>,
    /// Whether the summary table content changed
    pub summary_changed: bool,
    /// Whether the corpus was rebuilt and persisted
    pub corpus_rebuilt: bool,
}

/// Synchronize the local cache with the remote workbook.
///
/// Every sheet listed in the summary with a non-empty entered count is
/// ensured present locally; sheets within the recent window are re-fetched
/// unconditionally. With `force_all` the local cache is ignored entirely.
/// The corpus is rebuilt whenever any sheet or the summary itself changed.
pub fn refresh<S: SheetSource>(
    source: &mut S,
    cache: &SnapshotCache,
    today: NaiveDate,
    options: &SyncOptions,
    force_all: bool,
) -> Result<RefreshReport> {
    let summary_grid = fetch_with_retry(options, "summary", || source.fetch_summary())
        .map_err(|e| QueueForecastError::DataError(format!("Cannot fetch summary table: {e}")))?;
    let summary_changed = match cache.load_summary()? {
        Some(old) => old != summary_grid,
        None => true,
    };
    cache.store_summary(&summary_grid)?;
    let summary = SummaryTable::parse(&summary_grid)?;

    let targets = summary.sheets_with_attendance();
    let cutoff = today - Duration::days(options.refresh_recent_days);

    let mut report = RefreshReport {
        summary_changed,
        ..RefreshReport::default()
    };
    let mut any_sheet_changed = false;

    let total = targets.len();
    for (i, (sheet_name, sheet_date)) in targets.into_iter().enumerate() {
        if !force_all && sheet_date < cutoff && cache.has_snapshot(sheet_date) {
            continue;
        }

        match fetch_with_retry(options, &sheet_name, || {
            source.fetch_daily_snapshot(&sheet_name)
        }) {
            Ok(grid) => {
                cache.store_snapshot(sheet_date, &grid)?;
                report.downloaded += 1;
                any_sheet_changed = true;
            }
            Err(e) => {
                log::warn!("skipping sheet {sheet_name}: {e}");
                report.skipped_days.push(sheet_name);
            }
        }

        if i + 1 < total && !options.inter_request_delay.is_zero() {
            thread::sleep(options.inter_request_delay);
        }
    }

    if any_sheet_changed || summary_changed {
        rebuild_corpus(cache)?;
        report.corpus_rebuilt = true;
    }

    log::info!(
        "refresh done: {} downloaded, {} skipped, corpus rebuilt: {}",
        report.downloaded,
        report.skipped_days.len(),
        report.corpus_rebuilt
    );
    Ok(report)
}

/// Fetch with bounded exponential backoff. Rate-limit and network failures
/// are retried; anything else fails immediately.
fn fetch_with_retry<T>(
    options: &SyncOptions,
    what: &str,
    mut fetch: impl FnMut() -> FetchResult<T>,
) -> FetchResult<T> {
    let mut attempt = 0;
    loop {
        match fetch() {
            Ok(value) => return Ok(value),
            Err(e @ (FetchError::RateLimited | FetchError::Network(_)))
                if attempt + 1 < options.max_retries =>
            {
                let wait = options.retry_base_delay * 2u32.pow(attempt);
                log::warn!("fetch of {what} failed ({e}), retrying in {wait:?}");
                if !wait.is_zero() {
                    thread::sleep(wait);
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Re-derive the full corpus from all cached daily snapshots and persist it.
///
/// Each cached file's sheet date is mapped to the summary table's visit date
/// for that sheet; files the summary does not know about are skipped, as are
/// snapshots that fail to parse.
pub fn rebuild_corpus(cache: &SnapshotCache) -> Result<AttendanceCorpus> {
    let summary_grid = cache.load_summary()?.ok_or_else(|| {
        QueueForecastError::DataError("Cannot rebuild corpus: no cached summary table".to_string())
    })?;
    let summary = SummaryTable::parse(&summary_grid)?;

    let mut points = Vec::new();
    for sheet_date in cache.cached_dates()? {
        let sheet_name = sheet_date.format(SHEET_DATE_FORMAT).to_string();
        let Some(visit_date) = summary.visit_date_for_sheet(&sheet_name) else {
            continue;
        };
        let Some(grid) = cache.load_snapshot(sheet_date)? else {
            continue;
        };
        let parsed = match parse_snapshot(sheet_date, &grid) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("snapshot {sheet_date} not usable for the corpus: {e}");
                continue;
            }
        };
        for record in parsed.records {
            if record.status.is_entered() {
                points.push(AttendancePoint {
                    date: visit_date,
                    id: record.identifier,
                    is_live: record.status == crate::snapshot::AttendanceStatus::EnteredLiveQueue,
                });
            }
        }
    }

    let corpus = AttendanceCorpus { points };
    cache.store_corpus(&corpus)?;
    log::info!("corpus rebuilt: {} points", corpus.len());
    Ok(corpus)
}

/// Corpus source backed by the persisted JSON file.
pub struct PersistedCorpus<'a> {
    pub cache: &'a SnapshotCache,
}

impl CorpusSource for PersistedCorpus<'_> {
    fn name(&self) -> &str {
        "persisted json"
    }

    fn load(&mut self) -> Result<Option<AttendanceCorpus>> {
        self.cache.load_corpus()
    }
}

/// Corpus source that rebuilds from the cached daily snapshots.
pub struct RebuiltCorpus<'a> {
    pub cache: &'a SnapshotCache,
}

impl CorpusSource for RebuiltCorpus<'_> {
    fn name(&self) -> &str {
        "snapshot rebuild"
    }

    fn load(&mut self) -> Result<Option<AttendanceCorpus>> {
        if self.cache.load_summary()?.is_none() {
            return Ok(None);
        }
        rebuild_corpus(self.cache).map(Some)
    }
}

/// Load the corpus through the standard fallback chain: the persisted JSON
/// first, then a rebuild from cached snapshots. `None` means no data source
/// has anything yet.
pub fn load_corpus_chain(cache: &SnapshotCache) -> Result<Option<AttendanceCorpus>> {
    let mut sources: Vec<Box<dyn CorpusSource + '_>> = vec![
        Box::new(PersistedCorpus { cache }),
        Box::new(RebuiltCorpus { cache }),
    ];
    crate::corpus::first_available(&mut sources)
}
