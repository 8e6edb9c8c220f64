//! The queue-position prediction engine
//!
//! Fits an exponentially recency-weighted straight line of
//! business-day-ordinal-served against numeric identifier, then wraps the
//! point forecast in Student-t prediction intervals. Sample sizes are small,
//! so t quantiles are used rather than normal ones. The engine never panics
//! on bad data: anything it cannot forecast comes back as
//! [`Prediction::InsufficientData`], and probability queries degrade to 0%.

use crate::corpus::AttendanceCorpus;
use chrono::NaiveDate;
use queue_math::regression::WeightedLinearFit;
use queue_math::workdays;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Exponent range of the recency weights: the oldest grouped point gets
/// weight e^-3, the newest e^1 (roughly 55x heavier).
pub const WEIGHT_EXP_MIN: f64 = -3.0;
pub const WEIGHT_EXP_MAX: f64 = 1.0;

/// Minimum number of distinct grouped identifiers for a valid fit.
pub const MIN_GROUPED_POINTS: usize = 5;

/// Engine parameters.
#[derive(Debug, Clone)]
pub struct ForecastParams {
    /// Weight multiplier for live-queue (walk-in) points. The default of 0
    /// excludes them from the fit entirely: walk-ins do not follow the
    /// scheduled serving order.
    pub live_queue_weight: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            live_queue_weight: 0.0,
        }
    }
}

/// A Student-t distribution descriptor over the ordinal axis, sufficient to
/// answer arbitrary-date probability queries after the prediction was made.
#[derive(Debug, Clone, PartialEq)]
pub struct TDist {
    /// Predicted ordinal (location)
    pub loc: f64,
    /// Prediction standard error (scale)
    pub scale: f64,
    /// Degrees of freedom
    pub df: f64,
}

impl TDist {
    /// Cumulative probability at `x` on the ordinal axis, in [0, 1].
    ///
    /// Forecasts are advisory: any failure inside the distribution (zero
    /// scale, bad degrees of freedom, non-finite input) degrades to 0.
    pub fn cdf(&self, x: f64) -> f64 {
        if !x.is_finite() {
            return 0.0;
        }
        match StudentsT::new(self.loc, self.scale, self.df) {
            Ok(dist) => {
                let p = dist.cdf(x);
                if p.is_finite() {
                    p
                } else {
                    0.0
                }
            }
            Err(_) => 0.0,
        }
    }
}

/// Forecast window for one queried identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionWindow {
    /// Point forecast
    pub mean: NaiveDate,
    /// 50% two-sided interval
    pub lower50: NaiveDate,
    pub upper50: NaiveDate,
    /// 90% two-sided interval
    pub lower90: NaiveDate,
    pub upper90: NaiveDate,
    /// Reusable distribution descriptor for later probability queries
    pub dist: TDist,
    /// How many corpus points informed the fit
    pub data_points: usize,
}

/// The engine's output: either a forecast window or an explicit
/// insufficient-data signal. Callers must treat the latter as a normal
/// branch and fall back to a plain list of upcoming working days.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Window(PredictionWindow),
    InsufficientData,
}

impl Prediction {
    pub fn window(&self) -> Option<&PredictionWindow> {
        match self {
            Prediction::Window(w) => Some(w),
            Prediction::InsufficientData => None,
        }
    }
}

/// Produce a forecast for the given numeric identifier.
///
/// The corpus is read-only here; refreshes must swap in a new corpus value
/// rather than mutate one a prediction may be reading.
pub fn predict(corpus: &AttendanceCorpus, queried_id: f64, params: &ForecastParams) -> Prediction {
    let grouped = corpus.grouped();
    let n = grouped.len();
    if n < MIN_GROUPED_POINTS {
        return Prediction::InsufficientData;
    }

    let x: Vec<f64> = grouped.iter().map(|g| g.id).collect();
    let y: Vec<f64> = grouped.iter().map(|g| g.ordinal).collect();
    let weights: Vec<f64> = grouped
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let span = WEIGHT_EXP_MAX - WEIGHT_EXP_MIN;
            let w = (WEIGHT_EXP_MIN + (i as f64 / (n - 1) as f64) * span).exp();
            if g.is_live {
                w * params.live_queue_weight
            } else {
                w
            }
        })
        .collect();

    let Ok(fit) = WeightedLinearFit::fit(&x, &y, &weights) else {
        return Prediction::InsufficientData;
    };

    let Ok(unit_t) = StudentsT::new(0.0, 1.0, fit.degrees_of_freedom) else {
        return Prediction::InsufficientData;
    };
    let t90 = unit_t.inverse_cdf(0.95);
    let t50 = unit_t.inverse_cdf(0.75);

    let predicted = fit.predict_at(queried_id);
    let std_error = fit.standard_error_at(queried_id);

    let margin90 = t90 * std_error;
    let margin50 = t50 * std_error;
    let mut lower90 = predicted - margin90;
    let mut lower50 = predicted - margin50;
    let upper50 = predicted + margin50;
    let upper90 = predicted + margin90;

    // Never predict a lower bound in the already-observed past for an
    // identifier beyond everything seen so far.
    let max_seen_id = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if queried_id > max_seen_id {
        if let Some(max_ordinal) = corpus.max_ordinal() {
            let min_feasible = (max_ordinal + 1) as f64;
            lower90 = lower90.max(min_feasible);
            lower50 = lower50.max(min_feasible);
        }
    }

    let ordinals = [predicted, lower50, upper50, lower90, upper90];
    if ordinals.iter().any(|v| !v.is_finite()) || !std_error.is_finite() {
        return Prediction::InsufficientData;
    }

    Prediction::Window(PredictionWindow {
        mean: date_from(predicted),
        lower50: date_from(lower50),
        upper50: date_from(upper50),
        lower90: date_from(lower90),
        upper90: date_from(upper90),
        dist: TDist {
            loc: predicted,
            scale: std_error,
            df: fit.degrees_of_freedom,
        },
        data_points: corpus.len(),
    })
}

/// Probability, in percent, that the queue reaches the distribution's
/// identifier by the end of the given date.
///
/// Ordinals denote day-start instants, so the end of a business day sits one
/// ordinal later; hence the +1 before evaluating the CDF.
pub fn cumulative_probability(date: NaiveDate, dist: &TDist) -> f64 {
    let end_of_day = (workdays::to_ordinal(date) + 1) as f64;
    dist.cdf(end_of_day) * 100.0
}

/// Fractional ordinals truncate toward zero, matching the rest of the
/// calendar arithmetic.
fn date_from(ordinal: f64) -> NaiveDate {
    workdays::from_ordinal(ordinal as i64)
}
