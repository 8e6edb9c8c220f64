//! # Queue Forecast
//!
//! A Rust library for forecasting when a queue position on a commission
//! waiting list will be served, driven by spreadsheet-exported daily
//! attendance snapshots.
//!
//! ## Features
//!
//! - Daily snapshot parsing with header detection and skip-reason reporting
//! - A durable attendance corpus with incremental refresh and full rebuild
//! - Recency-weighted linear regression with Student-t prediction intervals
//! - Arbitrary-date cumulative-probability queries on a fitted forecast
//! - Rule-based queue-admission eligibility checks
//! - Per-day throughput statistics and capacity metrics
//!
//! ## Quick Start
//!
//! ```no_run
//! use queue_forecast::prediction::{cumulative_probability, predict, ForecastParams, Prediction};
//! use queue_forecast::sync::{load_corpus_chain, SnapshotCache};
//!
//! # fn main() -> queue_forecast::Result<()> {
//! let cache = SnapshotCache::new("daily_sheets_cache")?;
//! let corpus = load_corpus_chain(&cache)?.unwrap_or_default();
//!
//! match predict(&corpus, 4355.0, &ForecastParams::default()) {
//!     Prediction::Window(window) => {
//!         println!("expected between {} and {}", window.lower90, window.upper90);
//!         let date = window.upper50;
//!         println!("{}: {:.1}%", date, cumulative_probability(date, &window.dist));
//!     }
//!     Prediction::InsufficientData => {
//!         // fall back to a plain list of upcoming working days
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod corpus;
pub mod eligibility;
pub mod error;
pub mod prediction;
pub mod snapshot;
pub mod stats;
pub mod summary;
pub mod sync;

// Re-export commonly used types
pub use crate::corpus::{AttendanceCorpus, AttendancePoint};
pub use crate::eligibility::{check_admission, AdmissionDecision};
pub use crate::error::{QueueForecastError, Result};
pub use crate::prediction::{cumulative_probability, predict, ForecastParams, Prediction};
pub use crate::snapshot::{parse_snapshot, AttendanceRecord, AttendanceStatus, Grid};
pub use crate::summary::SummaryTable;
pub use crate::sync::{refresh, SheetSource, SnapshotCache, SyncOptions};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
