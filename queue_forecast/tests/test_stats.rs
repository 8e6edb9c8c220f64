use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use queue_forecast::snapshot::{AttendanceRecord, AttendanceStatus, Grid};
use queue_forecast::stats::{
    calculate_metrics, rank_entry_probability, rank_entry_probability_within, DayStats,
    RECENT_DAYS_WINDOW,
};
use queue_forecast::summary::SummaryTable;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(position: u32, identifier: &str, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
        sheet_date: date(2024, 3, 4),
        position,
        identifier: identifier.to_string(),
        status,
    }
}

#[test]
fn test_day_stats_from_a_mixed_day() {
    let records = vec![
        record(1, "100", AttendanceStatus::Entered),
        record(2, "101", AttendanceStatus::NoShow),
        record(3, "102", AttendanceStatus::Entered),
        record(4, "103", AttendanceStatus::EnteredLiveQueue),
        record(5, "104", AttendanceStatus::Postponed),
        record(6, "105", AttendanceStatus::Entered),
        // Beyond the last entered position: never called, not a no-show
        record(7, "106", AttendanceStatus::NoShow),
        record(8, "107", AttendanceStatus::NotEntered),
    ];
    let stats = DayStats::from_records(date(2024, 3, 4), &records).unwrap();

    assert_eq!(stats.positions_processed, 6);
    assert_eq!(stats.entered, 3);
    assert_eq!(stats.entered_live, 1);
    assert_eq!(stats.no_show, 1);
    assert_eq!(stats.postponed, 1);
    assert_eq!(stats.last_entered_id, Some("105".to_string()));
}

#[test]
fn test_day_stats_without_any_entered() {
    let records = vec![
        record(1, "100", AttendanceStatus::NoShow),
        record(2, "101", AttendanceStatus::Postponed),
    ];
    let stats = DayStats::from_records(date(2024, 3, 4), &records).unwrap();
    assert_eq!(stats.positions_processed, 0);
    assert_eq!(stats.entered, 0);
    // With no last entered position, nobody was skipped over
    assert_eq!(stats.no_show, 0);
    assert_eq!(stats.last_entered_id, None);
}

#[test]
fn test_day_stats_of_an_empty_day() {
    assert_eq!(DayStats::from_records(date(2024, 3, 4), &[]), None);
}

#[test]
fn test_metrics_over_several_days() {
    let day = |d: u32, processed: u32, entered: u32, no_show: u32| DayStats {
        date: date(2024, 3, d),
        positions_processed: processed,
        entered,
        entered_live: 1,
        no_show,
        postponed: 0,
        last_entered_id: None,
    };
    let stats = vec![day(4, 10, 8, 2), day(5, 20, 17, 3), day(6, 30, 25, 5)];
    let metrics = calculate_metrics(&stats).unwrap();

    assert!((metrics.avg_positions_processed - 20.0).abs() < 1e-9);
    assert!((metrics.std_positions_processed - 10.0).abs() < 1e-9);
    assert!((metrics.avg_entered - 50.0 / 3.0).abs() < 1e-9);
    assert!((metrics.avg_live_entries - 1.0).abs() < 1e-9);
    assert!((metrics.no_show_rate - 10.0 / 60.0).abs() < 1e-9);
    assert_eq!(metrics.total_days, 3);
    assert_eq!(metrics.min_positions, 10);
    assert_eq!(metrics.max_positions, 30);

    let rendered = metrics.to_string();
    assert!(rendered.contains("Days observed:        3"));
    assert!(rendered.contains("16.7%"));
}

#[test]
fn test_metrics_need_data() {
    assert_eq!(calculate_metrics(&[]), None);
}

fn summary_with_counts(counts: &[&str]) -> SummaryTable {
    let mut grid: Grid = vec![vec![
        "Аркуш".to_string(),
        "Дата прийому".to_string(),
        "Зайшов".to_string(),
        "Останній номер що зайшов".to_string(),
    ]];
    for (i, count) in counts.iter().enumerate() {
        let name = format!("{:02}.03.2024", i + 1);
        grid.push(vec![name.clone(), name, count.to_string(), "100".to_string()]);
    }
    SummaryTable::parse(&grid).unwrap()
}

#[test]
fn test_rank_entry_probability() {
    let summary = summary_with_counts(&["10", "20", "0", "15", "5"]);
    // Zero-throughput days are excluded from the window
    assert!((rank_entry_probability_within(&summary, 1, 10) - 100.0).abs() < 1e-9);
    assert!((rank_entry_probability_within(&summary, 12, 10) - 50.0).abs() < 1e-9);
    assert!((rank_entry_probability_within(&summary, 25, 10) - 0.0).abs() < 1e-9);
}

#[test]
fn test_rank_entry_probability_honours_the_window() {
    let summary = summary_with_counts(&["30", "10", "10"]);
    // Only the two most recent counts are considered
    assert!((rank_entry_probability_within(&summary, 20, 2) - 0.0).abs() < 1e-9);
    assert!((rank_entry_probability_within(&summary, 20, 3) - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_rank_entry_probability_default_window() {
    // Twelve days of history: the default window sees only the last ten,
    // so the two old high-throughput days drop out
    let mut counts = vec!["30", "30"];
    counts.extend(std::iter::repeat("5").take(RECENT_DAYS_WINDOW));
    let summary = summary_with_counts(&counts);

    assert!((rank_entry_probability(&summary, 20) - 0.0).abs() < 1e-9);
    assert!((rank_entry_probability(&summary, 5) - 100.0).abs() < 1e-9);
    assert!(
        (rank_entry_probability_within(&summary, 20, RECENT_DAYS_WINDOW + 2)
            - 200.0 / 12.0)
            .abs()
            < 1e-9
    );
}

#[test]
fn test_rank_entry_probability_without_history() {
    let summary = summary_with_counts(&[]);
    assert_eq!(rank_entry_probability(&summary, 1), 0.0);
}
