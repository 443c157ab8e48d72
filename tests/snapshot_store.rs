use chrono::NaiveDate;
use serde_json::{json, Value};
use social_metrics::platform::default_platforms;
use social_metrics::record::parse_snapshot_date;
use social_metrics::{DateRange, Metric, RawRecord, SnapshotStore};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn row(value: Value) -> RawRecord {
    value.as_object().cloned().unwrap()
}

fn ingest(rows: Vec<Value>) -> SnapshotStore {
    let rows: Vec<RawRecord> = rows.into_iter().map(row).collect();
    SnapshotStore::ingest(&rows, &default_platforms())
}

#[test]
fn same_day_rows_keep_the_last_arrival() {
    let store = ingest(vec![
        json!({"StudentID": "S1", "Name": "Ana", "Date": "2025-01-01", "IG_Username": "ana", "IG_Followers": "100"}),
        json!({"StudentID": "S1", "Name": "Ana", "Date": "2025-01-01T20:00:00Z", "IG_Username": "ana", "IG_Followers": "150"}),
    ]);

    assert_eq!(store.len(), 1);
    let snapshot = store.latest_for("S1").unwrap();
    assert_eq!(snapshot.metric("IG", Metric::Followers), Some(150.0));
    assert_eq!(snapshot.arrival, 1);
}

#[test]
fn snapshots_are_ordered_by_day_regardless_of_log_order() {
    let store = ingest(vec![
        json!({"StudentID": "S1", "Date": "2025-01-03", "IG_Followers": 30}),
        json!({"StudentID": "S1", "Date": "2025-01-01", "IG_Followers": 10}),
        json!({"StudentID": "S1", "Date": "01/02/2025", "IG_Followers": 20}),
    ]);

    let days: Vec<NaiveDate> = store.snapshots().iter().filter_map(|s| s.date).collect();
    assert_eq!(days, vec![day(1), day(2), day(3)]);

    let history = store.history_for("S1", "IG");
    let values: Vec<f64> = history
        .iter()
        .filter_map(|s| s.metric("IG", Metric::Followers))
        .collect();
    assert_eq!(values, vec![10.0, 20.0, 30.0]);
}

#[test]
fn undated_rows_sort_last_and_stay_out_of_history() {
    let store = ingest(vec![
        json!({"StudentID": "S1", "Date": "someday", "IG_Followers": 99}),
        json!({"StudentID": "S1", "Date": "2025-01-01", "IG_Followers": 10}),
        json!({"StudentID": "S1", "Date": "", "IG_Followers": 42}),
    ]);

    // Both undated rows share the (S1, undated) key.
    assert_eq!(store.len(), 2);
    assert!(store.snapshots()[0].date.is_some());
    let undated: Vec<_> = store.undated().collect();
    assert_eq!(undated.len(), 1);
    assert_eq!(undated[0].metric("IG", Metric::Followers), Some(42.0));

    assert_eq!(store.history_for("S1", "IG").len(), 1);
    assert_eq!(store.current_date(), Some(day(1)));
}

#[test]
fn rows_without_entity_id_are_dropped() {
    let store = ingest(vec![
        json!({"Name": "Ghost", "Date": "2025-01-01", "IG_Followers": 10}),
        json!({"StudentID": "  ", "Date": "2025-01-01", "IG_Followers": 10}),
        json!({"StudentID": 7, "Name": "Numeric", "Date": "2025-01-01", "IG_Followers": 10}),
    ]);

    assert_eq!(store.len(), 1);
    assert_eq!(store.entities(), &["7".to_string()]);
    assert_eq!(store.name_of("7"), Some("Numeric"));
}

#[test]
fn unknown_fields_are_ignored_and_counts_are_clean() {
    let store = ingest(vec![json!({
        "StudentID": "S1",
        "Date": "2025-01-01",
        "Cohort": "B7",
        "XX_Followers": "5",
        "IG_Username": "ana",
        "IG_Followers": "-40",
        "TT_Username": "ana.tt",
        "TT_Followers": "2.5K",
        "TH_Username": "",
        "TH_Followers": "N/A"
    })]);

    let snapshot = store.latest_for("S1").unwrap();
    assert!(snapshot.platform("XX").is_none());
    assert_eq!(snapshot.metric("IG", Metric::Followers), Some(0.0));
    assert_eq!(snapshot.metric("TT", Metric::Followers), Some(2500.0));
    assert_eq!(snapshot.metric("TH", Metric::Followers), None);
    assert_eq!(snapshot.platform("TH").unwrap().follower_count(), 0.0);
    assert_eq!(snapshot.linked_platforms(), vec!["IG", "TT"]);

    for snapshot in store.snapshots() {
        for stats in snapshot.platforms.values() {
            assert!(stats.follower_count() >= 0.0);
        }
    }
}

#[test]
fn latest_for_reads_the_store_wide_current_date() {
    let store = ingest(vec![
        json!({"StudentID": "A", "Date": "2025-01-01", "IG_Followers": 1}),
        json!({"StudentID": "B", "Date": "2025-01-02", "IG_Followers": 2}),
        json!({"StudentID": "A", "Date": "2025-01-03", "IG_Followers": 3}),
    ]);

    assert_eq!(store.current_date(), Some(day(3)));
    assert_eq!(store.latest_for("A").unwrap().date, Some(day(3)));
    assert!(store.latest_for("B").is_none());
    assert!(store.latest_for("missing").is_none());

    let current: Vec<&str> = store
        .current_snapshots()
        .iter()
        .map(|s| s.entity_id.as_str())
        .collect();
    assert_eq!(current, vec!["A"]);
}

#[test]
fn at_or_before_lookups_respect_the_cutoff() {
    let store = ingest(vec![
        json!({"StudentID": "A", "Date": "2025-01-01", "IG_Followers": 1}),
        json!({"StudentID": "A", "Date": "2025-01-05", "TT_Followers": 2}),
        json!({"StudentID": "A", "Date": "2025-01-09", "IG_Followers": 3}),
    ]);

    assert_eq!(store.all_at_or_before("A", "IG", day(8)).len(), 1);
    assert_eq!(store.all_at_or_before("A", "IG", day(9)).len(), 2);
    assert!(store.all_at_or_before("A", "IG", NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()).is_empty());

    let latest = store.latest_at_or_before("A", day(6)).unwrap();
    assert_eq!(latest.date, Some(day(5)));
}

#[test]
fn within_restricts_to_the_range() {
    let store = ingest(vec![
        json!({"StudentID": "A", "Date": "2025-01-01", "IG_Followers": 1}),
        json!({"StudentID": "B", "Date": "2025-01-02", "IG_Followers": 2}),
        json!({"StudentID": "A", "Date": "2025-01-03", "IG_Followers": 3}),
        json!({"StudentID": "C", "Date": "bad", "IG_Followers": 4}),
    ]);

    let scoped = store.within(DateRange::new(day(2), day(3)));
    assert_eq!(scoped.len(), 2);
    assert_eq!(scoped.entities(), &["A".to_string(), "B".to_string()]);
    assert_eq!(scoped.date_span(), Some(DateRange::new(day(2), day(3))));

    let earlier = store.within(DateRange::single(day(2)));
    assert_eq!(earlier.current_date(), Some(day(2)));
    assert_eq!(earlier.latest_for("B").map(|s| s.date), Some(Some(day(2))));
    assert!(earlier.latest_for("A").is_none());

    let empty = store.within(DateRange::new(day(3), day(1)));
    assert!(empty.is_empty());
    assert_eq!(empty.current_date(), None);
    assert_eq!(store.date_span(), Some(DateRange::new(day(1), day(3))));
}

#[test]
fn snapshot_dates_accept_common_formats() {
    assert_eq!(parse_snapshot_date("2025-01-04"), Some(day(4)));
    assert_eq!(parse_snapshot_date("2025-01-04T23:59:59Z"), Some(day(4)));
    assert_eq!(parse_snapshot_date("2025-01-04T10:00:00+08:00"), Some(day(4)));
    assert_eq!(parse_snapshot_date("2025-01-04 10:00:00"), Some(day(4)));
    assert_eq!(parse_snapshot_date("01/04/2025"), Some(day(4)));
    assert_eq!(parse_snapshot_date(""), None);
    assert_eq!(parse_snapshot_date("next week"), None);
}
