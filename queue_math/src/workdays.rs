//! Business-day calendar arithmetic
//!
//! The regression runs on a compact integer time axis that counts only
//! working days (Mon-Fri). Exactly 5 ordinals are consumed per 7 calendar
//! days, so the fitted line sees no weekend gaps. Saturday and Sunday clamp
//! to the preceding Friday's ordinal.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Anchor Monday: 1970-01-05 maps to ordinal 0.
fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 5).unwrap()
}

/// Convert a calendar date to its business-day ordinal.
///
/// Monday through Friday map to consecutive ordinals; Saturday and Sunday
/// share the ordinal of the Friday before them.
pub fn to_ordinal(date: NaiveDate) -> i64 {
    let diff = (date - anchor()).num_days();
    let weeks = diff.div_euclid(7);
    let days = diff.rem_euclid(7);
    weeks * 5 + days.min(4)
}

/// Convert a business-day ordinal back to a calendar date.
///
/// Only ordinals produced by business days round-trip exactly; the result
/// is always a Monday-Friday date.
pub fn from_ordinal(ordinal: i64) -> NaiveDate {
    let weeks = ordinal.div_euclid(5);
    let days = ordinal.rem_euclid(5);
    anchor() + Duration::days(weeks * 7 + days)
}

/// True for Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The current business day: `date` itself if it is a weekday, otherwise
/// the preceding Friday.
pub fn current_business_day(date: NaiveDate) -> NaiveDate {
    let mut day = date;
    while !is_business_day(day) {
        day -= Duration::days(1);
    }
    day
}

/// The next `count` working days strictly after `after`, weekends skipped.
pub fn next_working_days(after: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut result = Vec::with_capacity(count);
    let mut current = after + Duration::days(1);
    while result.len() < count {
        if is_business_day(current) {
            result.push(current);
        }
        current += Duration::days(1);
    }
    result
}
