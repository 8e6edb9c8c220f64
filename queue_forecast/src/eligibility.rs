//! Queue-admission eligibility rules
//!
//! A small deterministic rule set, independent of the regression, deciding
//! whether an identifier may still (re)join the queue. Rules are evaluated
//! in order and the first match wins. The cost of the missed-day scan is
//! O(rows) over the summary table, which is fine at this domain's scale.

use crate::summary::SummaryTable;
use chrono::NaiveDate;
use queue_math::workdays;

/// An earlier accepted booking of the same identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorBooking {
    /// Booked visit date
    pub date: NaiveDate,
    /// Whether the booking was approved (not cancelled)
    pub approved: bool,
}

/// The checker's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub eligible: bool,
    /// Empty when nothing needs saying; otherwise a warning or refusal text
    pub message: String,
}

impl AdmissionDecision {
    fn eligible(message: impl Into<String>) -> Self {
        Self {
            eligible: true,
            message: message.into(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            eligible: false,
            message: message.into(),
        }
    }
}

/// Decide whether `main_id` may register or transfer into the queue.
///
/// Rules, first match wins:
/// 1. The identifier is at or beyond the highest "last served" figure in
///    the summary: eligible, nothing to say.
/// 2. An approved prior booking strictly after the current business day:
///    already validly queued ahead, eligible.
/// 3. Otherwise count the days the queue has moved past this identifier
///    (a running-maximum scan over the summary's last-served column). One
///    missed day is forgiven with a last-attempt warning; more than one is
///    a refusal naming the exact count.
///
/// With an empty summary there is nothing to hold against the caller, so
/// the decision defaults to eligible.
pub fn check_admission(
    main_id: u64,
    prior_booking: Option<&PriorBooking>,
    summary: &SummaryTable,
    today: NaiveDate,
) -> AdmissionDecision {
    let id = main_id as f64;

    let Some(max_last_entered) = summary.max_last_entered() else {
        return AdmissionDecision::eligible("");
    };
    if id >= max_last_entered {
        return AdmissionDecision::eligible("");
    }

    if let Some(booking) = prior_booking {
        if booking.approved && booking.date > workdays::current_business_day(today) {
            return AdmissionDecision::eligible("");
        }
    }

    let missed = missed_days(summary, id);
    if missed <= 1 {
        AdmissionDecision::eligible(
            "You missed your place in the queue by one day. \
             This registration is your last attempt.",
        )
    } else {
        AdmissionDecision::rejected(format!(
            "You missed your place in the queue: {missed} days were missed. \
             Registration for upcoming days is not possible."
        ))
    }
}

/// Number of days the queue has already been past `id`: a running maximum
/// of the last-served identifier over the chronological summary rows,
/// counting the rows where that high-water mark exceeds the queried value.
fn missed_days(summary: &SummaryTable, id: f64) -> usize {
    let mut high_water = f64::NEG_INFINITY;
    let mut missed = 0;
    for row in &summary.rows {
        if let Some(last) = row.last_entered_id {
            high_water = high_water.max(last);
        }
        if high_water > id {
            missed += 1;
        }
    }
    missed
}
