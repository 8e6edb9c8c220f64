//! The attendance corpus
//!
//! Every person actually served, across all historical days, collapsed into
//! a flat append-friendly collection. The corpus is what the prediction
//! engine consumes; it is persisted as a single JSON file and rebuilt
//! wholesale from the cached daily snapshots when stale.

use crate::error::Result;
use chrono::NaiveDate;
use queue_math::{ident, workdays};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One served person on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePoint {
    /// Calendar date actually served (the visit date, not registration)
    pub date: NaiveDate,
    /// Raw identifier as written in the sheet
    pub id: String,
    /// True when admitted via the live (walk-in) queue
    pub is_live: bool,
}

/// The full historical collection of attendance points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCorpus {
    pub points: Vec<AttendancePoint>,
}

/// One grouped observation for the regression: a distinct identifier with
/// the mean ordinal date it was served on.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedPoint {
    /// Normalized numeric identifier
    pub id: f64,
    /// Mean business-day ordinal across the days this identifier was served
    pub ordinal: f64,
    /// True if any of those servings came through the live queue
    pub is_live: bool,
}

/// On-disk shape of the persisted corpus.
#[derive(Serialize, Deserialize)]
struct CorpusFile {
    attendance_points: Vec<AttendancePoint>,
    total_points: usize,
}

impl AttendanceCorpus {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Collapse the corpus to one point per distinct identifier, sorted by
    /// ordinal ascending.
    ///
    /// Identifiers group at the normalizer's 0.01 resolution. An identifier
    /// served more than once takes the mean ordinal and the OR of its
    /// live-queue flags. Points whose identifier does not normalize are
    /// dropped.
    pub fn grouped(&self) -> Vec<GroupedPoint> {
        struct Acc {
            ordinal_sum: f64,
            count: usize,
            is_live: bool,
        }

        let mut groups: BTreeMap<i64, Acc> = BTreeMap::new();
        for point in &self.points {
            let Some(numeric) = ident::to_numeric(&point.id) else {
                continue;
            };
            let key = (numeric * 100.0).round() as i64;
            let ordinal = workdays::to_ordinal(point.date) as f64;
            let acc = groups.entry(key).or_insert(Acc {
                ordinal_sum: 0.0,
                count: 0,
                is_live: false,
            });
            acc.ordinal_sum += ordinal;
            acc.count += 1;
            acc.is_live |= point.is_live;
        }

        let mut grouped: Vec<GroupedPoint> = groups
            .into_iter()
            .map(|(key, acc)| GroupedPoint {
                id: key as f64 / 100.0,
                ordinal: acc.ordinal_sum / acc.count as f64,
                is_live: acc.is_live,
            })
            .collect();
        grouped.sort_by(|a, b| {
            a.ordinal
                .partial_cmp(&b.ordinal)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        grouped
    }

    /// Highest business-day ordinal over all points (before grouping).
    pub fn max_ordinal(&self) -> Option<i64> {
        self.points
            .iter()
            .map(|p| workdays::to_ordinal(p.date))
            .max()
    }

    /// Persist the corpus, overwriting any previous file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = CorpusFile {
            attendance_points: self.points.clone(),
            total_points: self.points.len(),
        };
        fs::write(path, serde_json::to_vec_pretty(&file)?)?;
        Ok(())
    }

    /// Load a persisted corpus; `None` when the file does not exist.
    pub fn load_json(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        let file: CorpusFile = serde_json::from_slice(&bytes)?;
        Ok(Some(Self {
            points: file.attendance_points,
        }))
    }
}

/// A strategy for obtaining a corpus. Sources are tried in order; the first
/// one that yields a non-empty corpus wins.
pub trait CorpusSource {
    /// Short name for logging
    fn name(&self) -> &str;

    /// Try to produce a corpus. `Ok(None)` means "not available here";
    /// errors mean the store itself is broken and propagate.
    fn load(&mut self) -> Result<Option<AttendanceCorpus>>;
}

/// Try each source in order and return the first non-empty corpus.
pub fn first_available(
    sources: &mut [Box<dyn CorpusSource + '_>],
) -> Result<Option<AttendanceCorpus>> {
    for source in sources {
        match source.load()? {
            Some(corpus) if !corpus.is_empty() => {
                log::debug!("corpus loaded from '{}' ({} points)", source.name(), corpus.len());
                return Ok(Some(corpus));
            }
            _ => log::debug!("corpus source '{}' has no data", source.name()),
        }
    }
    Ok(None)
}
