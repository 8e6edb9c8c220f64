use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use queue_forecast::corpus::{
    first_available, AttendanceCorpus, AttendancePoint, CorpusSource,
};
use queue_forecast::Result;
use queue_math::workdays;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn point(d: NaiveDate, id: &str, is_live: bool) -> AttendancePoint {
    AttendancePoint {
        date: d,
        id: id.to_string(),
        is_live,
    }
}

#[test]
fn test_grouping_collapses_repeat_servings() {
    let corpus = AttendanceCorpus {
        points: vec![
            // Monday and Wednesday of the same week: mean ordinal is Tuesday
            point(date(2024, 3, 4), "4355", false),
            point(date(2024, 3, 6), "4355", true),
            point(date(2024, 3, 5), "4356/1", false),
        ],
    };
    let grouped = corpus.grouped();
    assert_eq!(grouped.len(), 2);

    let first = &grouped[0];
    assert!((first.id - 4355.0).abs() < 1e-9);
    let expected = (workdays::to_ordinal(date(2024, 3, 4)) as f64
        + workdays::to_ordinal(date(2024, 3, 6)) as f64)
        / 2.0;
    assert!((first.ordinal - expected).abs() < 1e-9);
    // One live serving marks the whole identifier
    assert!(first.is_live);

    let second = &grouped[1];
    assert!((second.id - 4356.01).abs() < 1e-9);
    assert!(!second.is_live);
}

#[test]
fn test_grouping_is_sorted_by_ordinal() {
    let corpus = AttendanceCorpus {
        points: vec![
            point(date(2024, 3, 8), "30", false),
            point(date(2024, 3, 4), "10", false),
            point(date(2024, 3, 6), "20", false),
        ],
    };
    let ordinals: Vec<f64> = corpus.grouped().iter().map(|g| g.ordinal).collect();
    assert!(ordinals.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_unparsable_identifiers_are_dropped() {
    let corpus = AttendanceCorpus {
        points: vec![
            point(date(2024, 3, 4), "4355", false),
            point(date(2024, 3, 4), "---", false),
            point(date(2024, 3, 4), "", false),
        ],
    };
    assert_eq!(corpus.grouped().len(), 1);
}

#[test]
fn test_suffix_variants_group_apart_from_the_base_id() {
    let corpus = AttendanceCorpus {
        points: vec![
            point(date(2024, 3, 4), "4355", false),
            point(date(2024, 3, 5), "4355/1", false),
            point(date(2024, 3, 6), "4355/1", false),
        ],
    };
    let grouped = corpus.grouped();
    assert_eq!(grouped.len(), 2);
    assert!((grouped[0].id - 4355.0).abs() < 1e-9);
    assert!((grouped[1].id - 4355.01).abs() < 1e-9);
}

#[test]
fn test_max_ordinal_covers_all_points() {
    let corpus = AttendanceCorpus {
        points: vec![
            point(date(2024, 3, 4), "10", false),
            // Unparsable id still counts toward the most recent day
            point(date(2024, 3, 8), "---", false),
        ],
    };
    assert_eq!(
        corpus.max_ordinal(),
        Some(workdays::to_ordinal(date(2024, 3, 8)))
    );
    assert_eq!(AttendanceCorpus::default().max_ordinal(), None);
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("attendance.json");
    let corpus = AttendanceCorpus {
        points: vec![
            point(date(2024, 3, 4), "4355", false),
            point(date(2024, 3, 5), "4356/1", true),
        ],
    };

    corpus.save_json(&path).unwrap();
    let loaded = AttendanceCorpus::load_json(&path).unwrap().unwrap();
    assert_eq!(loaded, corpus);

    assert_eq!(
        AttendanceCorpus::load_json(&dir.path().join("missing.json")).unwrap(),
        None
    );
}

#[test]
fn test_json_shape_is_stable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("attendance.json");
    let corpus = AttendanceCorpus {
        points: vec![point(date(2024, 3, 4), "4355", false)],
    };
    corpus.save_json(&path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["total_points"], 1);
    assert_eq!(raw["attendance_points"][0]["id"], "4355");
    assert_eq!(raw["attendance_points"][0]["is_live"], false);
}

struct FixedSource {
    name: &'static str,
    corpus: Option<AttendanceCorpus>,
}

impl CorpusSource for FixedSource {
    fn name(&self) -> &str {
        self.name
    }

    fn load(&mut self) -> Result<Option<AttendanceCorpus>> {
        Ok(self.corpus.clone())
    }
}

#[test]
fn test_first_available_skips_empty_sources() {
    let full = AttendanceCorpus {
        points: vec![point(date(2024, 3, 4), "10", false)],
    };
    let mut sources: Vec<Box<dyn CorpusSource>> = vec![
        Box::new(FixedSource {
            name: "absent",
            corpus: None,
        }),
        Box::new(FixedSource {
            name: "empty",
            corpus: Some(AttendanceCorpus::default()),
        }),
        Box::new(FixedSource {
            name: "full",
            corpus: Some(full.clone()),
        }),
    ];
    assert_eq!(first_available(&mut sources).unwrap(), Some(full));
}

#[test]
fn test_first_available_with_nothing_to_offer() {
    let mut sources: Vec<Box<dyn CorpusSource>> = vec![Box::new(FixedSource {
        name: "absent",
        corpus: None,
    })];
    assert_eq!(first_available(&mut sources).unwrap(), None);
}
