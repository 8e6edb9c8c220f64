use chrono::NaiveDate;
use queue_forecast::eligibility::{check_admission, PriorBooking};
use queue_forecast::snapshot::Grid;
use queue_forecast::summary::SummaryTable;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Summary with one row per (sheet name, last entered id) pair.
fn summary(rows: &[(&str, &str)]) -> SummaryTable {
    let mut grid: Grid = vec![vec![
        "Аркуш".to_string(),
        "Дата прийому".to_string(),
        "Зайшов".to_string(),
        "Останній номер що зайшов".to_string(),
    ]];
    for (sheet, last) in rows {
        grid.push(vec![
            sheet.to_string(),
            sheet.to_string(),
            "5".to_string(),
            last.to_string(),
        ]);
    }
    SummaryTable::parse(&grid).unwrap()
}

#[test]
fn test_empty_summary_is_eligible() {
    let table = summary(&[]);
    let decision = check_admission(4355, None, &table, date(2024, 3, 15));
    assert!(decision.eligible);
    assert!(decision.message.is_empty());
}

#[test]
fn test_id_at_or_past_the_queue_head_is_eligible() {
    let table = summary(&[("04.03.2024", "100"), ("05.03.2024", "200")]);
    for id in [200, 250] {
        let decision = check_admission(id, None, &table, date(2024, 3, 15));
        assert!(decision.eligible, "id {id} should be eligible");
        assert!(decision.message.is_empty());
    }
}

#[test]
fn test_approved_future_booking_is_eligible() {
    let table = summary(&[("04.03.2024", "100"), ("05.03.2024", "200")]);
    let booking = PriorBooking {
        date: date(2024, 3, 18),
        approved: true,
    };
    let decision = check_admission(120, Some(&booking), &table, date(2024, 3, 15));
    assert!(decision.eligible);
    assert!(decision.message.is_empty());
}

#[test]
fn test_booking_on_the_current_day_does_not_help() {
    let table = summary(&[
        ("04.03.2024", "100"),
        ("05.03.2024", "200"),
        ("06.03.2024", "210"),
    ]);
    let booking = PriorBooking {
        date: date(2024, 3, 15),
        approved: true,
    };
    let decision = check_admission(120, Some(&booking), &table, date(2024, 3, 15));
    assert!(!decision.eligible);
}

#[test]
fn test_unapproved_booking_does_not_help() {
    let table = summary(&[
        ("04.03.2024", "100"),
        ("05.03.2024", "200"),
        ("06.03.2024", "210"),
    ]);
    let booking = PriorBooking {
        date: date(2024, 3, 18),
        approved: false,
    };
    let decision = check_admission(120, Some(&booking), &table, date(2024, 3, 15));
    assert!(!decision.eligible);
}

#[test]
fn test_weekend_today_rolls_back_to_friday_for_rule_two() {
    // Saturday counts as Friday 15.03, so a Monday booking is still ahead
    let table = summary(&[("04.03.2024", "100"), ("05.03.2024", "200")]);
    let booking = PriorBooking {
        date: date(2024, 3, 18),
        approved: true,
    };
    let decision = check_admission(120, Some(&booking), &table, date(2024, 3, 16));
    assert!(decision.eligible);
}

#[test]
fn test_one_missed_day_gets_a_last_attempt_warning() {
    // Only the final row's high-water mark exceeds id 150
    let table = summary(&[
        ("04.03.2024", "100"),
        ("05.03.2024", "110"),
        ("06.03.2024", "200"),
    ]);
    let decision = check_admission(150, None, &table, date(2024, 3, 15));
    assert!(decision.eligible);
    assert!(decision.message.contains("last attempt"));
}

#[test]
fn test_several_missed_days_are_a_refusal_with_the_count() {
    // The queue was past id 120 on the last two days even though the final
    // day's own figure dropped back
    let table = summary(&[
        ("04.03.2024", "100"),
        ("05.03.2024", "200"),
        ("06.03.2024", "150"),
    ]);
    let decision = check_admission(120, None, &table, date(2024, 3, 15));
    assert!(!decision.eligible);
    assert!(decision.message.contains("2 days"));
}

#[test]
fn test_rows_without_a_last_entered_figure_are_ignored() {
    let table = summary(&[
        ("04.03.2024", ""),
        ("05.03.2024", "200"),
        ("06.03.2024", ""),
    ]);
    // The blank rows neither raise the high-water mark nor count as missed
    // before it is first set
    let decision = check_admission(150, None, &table, date(2024, 3, 15));
    assert!(!decision.eligible);
    assert!(decision.message.contains("2 days"));
}
