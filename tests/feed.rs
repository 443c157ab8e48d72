use chrono::NaiveDate;
use serde_json::{json, Value};
use social_metrics::feed::{entity_feed, initials, search_roster};
use social_metrics::platform::PlatformExtras;
use social_metrics::{EngineConfig, RawRecord, SnapshotStore};

fn ingest(rows: Vec<Value>, config: &EngineConfig) -> SnapshotStore {
    let rows: Vec<RawRecord> = rows
        .into_iter()
        .map(|value| value.as_object().cloned().unwrap())
        .collect();
    SnapshotStore::ingest(&rows, &config.platforms)
}

fn roster_rows() -> Vec<Value> {
    vec![
        json!({
            "StudentID": "S1", "Name": "ada lovelace", "Date": "2025-01-01",
            "IG_Username": "ada", "IG_Followers": 100, "IG_LaPostLikes": 5,
            "LI_Username": "ada-l", "LI_Followers": 300,
        }),
        json!({
            "StudentID": "S2", "Name": "Grace Hopper", "Date": "2025-01-08",
            "IG_Username": "grace", "IG_Followers": "N/A",
        }),
        json!({
            "StudentID": "S1", "Name": "ada lovelace", "Date": "2025-01-08",
            "IG_Username": "ada", "IG_Followers": "1,500", "IG_LaPostLikes": "30",
            "IG_LaPostComments": "4", "IG_LaPostDate": "2025-01-07T18:05:00Z",
            "IG_LaPostCaption": "x".repeat(130), "IG_LaPostURL": "https://example.com/p/1",
            "TT_Username": "", "TT_Followers": 9000,
            "LI_Username": "ada-l", "LI_Followers": "200", "LI_Connections": "1.2K",
        }),
    ]
}

#[test]
fn feed_lists_only_linked_platforms() {
    let config = EngineConfig::default();
    let store = ingest(roster_rows(), &config);

    let feed = entity_feed(&store, "S1", &config).unwrap();
    assert_eq!(feed.as_of, NaiveDate::from_ymd_opt(2025, 1, 8).unwrap());
    assert_eq!(feed.initials, "AL");

    let codes: Vec<&str> = feed.cards.iter().map(|card| card.platform.as_str()).collect();
    assert_eq!(codes, vec!["IG", "LI"]);
}

#[test]
fn feed_cards_carry_post_details_and_growth() {
    let config = EngineConfig::default();
    let store = ingest(roster_rows(), &config);
    let feed = entity_feed(&store, "S1", &config).unwrap();

    let ig = &feed.cards[0];
    assert_eq!(ig.username, "ada");
    assert!((ig.followers - 1500.0).abs() < 1e-6);
    assert!((ig.growth - 1400.0).abs() < 1e-6);
    assert!((ig.engagement - 2.0).abs() < 1e-6);
    assert_eq!(ig.post_date, "07 Jan 2025");
    assert_eq!(ig.caption.chars().count(), 111);
    assert!(ig.caption.ends_with('…'));
    assert_eq!(ig.post_url.as_deref(), Some("https://example.com/p/1"));
    assert!((ig.comments - 4.0).abs() < 1e-6);

    let li = &feed.cards[1];
    assert!((li.growth + 100.0).abs() < 1e-6);
    assert_eq!(
        li.extras,
        PlatformExtras::LinkedIn {
            connections: Some(1200.0)
        }
    );
    assert!(li.caption.is_empty());
}

#[test]
fn primary_flag_follows_the_largest_audience() {
    let mut config = EngineConfig::default();
    let store = ingest(roster_rows(), &config);

    // The unlinked TikTok row has the most followers, so no card is primary.
    let feed = entity_feed(&store, "S1", &config).unwrap();
    assert!(feed.cards.iter().all(|card| !card.primary));

    config.platforms.retain(|platform| platform.code != "TT");
    let feed = entity_feed(&store, "S1", &config).unwrap();
    let primary: Vec<&str> = feed
        .cards
        .iter()
        .filter(|card| card.primary)
        .map(|card| card.platform.as_str())
        .collect();
    assert_eq!(primary, vec!["IG"]);
}

#[test]
fn feed_without_followers_has_no_primary_or_post() {
    let config = EngineConfig::default();
    let store = ingest(roster_rows(), &config);

    let feed = entity_feed(&store, "S2", &config).unwrap();
    assert_eq!(feed.cards.len(), 1);
    let card = &feed.cards[0];
    assert!(!card.primary);
    assert_eq!(card.followers, 0.0);
    assert_eq!(card.engagement, 0.0);
    assert!(card.post_date.is_empty());
}

#[test]
fn feed_requires_a_current_snapshot() {
    let config = EngineConfig::default();
    let mut rows = roster_rows();
    rows.push(json!({"StudentID": "S3", "Name": "Old", "Date": "2025-01-02", "IG_Username": "old"}));
    let store = ingest(rows, &config);

    assert!(entity_feed(&store, "S3", &config).is_none());
    assert!(entity_feed(&store, "missing", &config).is_none());
}

#[test]
fn roster_search_is_case_insensitive() {
    let config = EngineConfig::default();
    let store = ingest(roster_rows(), &config);

    let everyone = search_roster(&store, "");
    let ids: Vec<&str> = everyone.iter().map(|entry| entry.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["S1", "S2"]);

    let hits = search_roster(&store, "  HOP ");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Grace Hopper");
    assert_eq!(hits[0].initials, "GH");

    assert!(search_roster(&store, "turing").is_empty());
}

#[test]
fn initials_take_two_words() {
    assert_eq!(initials("Ada Lovelace Byron"), "AL");
    assert_eq!(initials("  cher "), "C");
    assert_eq!(initials(""), "?");
}
