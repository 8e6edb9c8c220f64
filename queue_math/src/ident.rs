//! Two-part queue identifier normalization
//!
//! Queue identifiers are hand-typed strings of the form `4355` or `4355/1`:
//! a primary number plus an optional sub-sequence after a slash. For the
//! regression both parts collapse into one ordered value, with the
//! sub-sequence divided by 100 as the fractional part.

/// Convert a raw identifier to its numeric value, e.g. `"4355/1"` -> `4355.01`.
///
/// Trailing garbage after the leading digits is ignored; a string with no
/// leading digits yields `None` and the caller should skip the record.
///
/// Note: sub-sequence suffixes of 100 or more still divide by 100, so their
/// ordering relative to the next primary number is not preserved. The data
/// has never contained such suffixes; the limit is accepted as-is.
pub fn to_numeric(id: &str) -> Option<f64> {
    let s = id.trim();
    if s.is_empty() {
        return None;
    }
    let (main_part, suffix) = match s.split_once('/') {
        Some((main, rest)) => (main, Some(rest)),
        None => (s, None),
    };
    let main = leading_number(main_part)? as f64;

    let sub = match suffix {
        Some(raw) if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) => {
            raw.parse::<u64>().ok().unwrap_or(0)
        }
        _ => 0,
    };
    Some(main + sub as f64 / 100.0)
}

/// Extract the primary number of an identifier, e.g. `"4355/1"` -> `4355`.
pub fn main_number(id: &str) -> Option<u64> {
    leading_number(id.trim())
}

fn leading_number(s: &str) -> Option<u64> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok()
}
