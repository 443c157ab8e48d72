use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use social_metrics::feed::RosterEntry;
use social_metrics::metrics::{Leaderboard, LeaderboardEntry, PlatformShare, SeriesPoint};
use social_metrics::platform::find_platform;
use social_metrics::{DateRange, Metric, MetricRecord, Platform, RankMetric, SnapshotStore};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub platform: Option<String>,
    pub metric: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub top: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub platform: Option<String>,
    pub metric: Option<String>,
    /// Comma-separated entity ids; empty means the leaderboard leaders.
    pub entities: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct EntityMetricQuery {
    pub entity: String,
    pub platform: Option<String>,
    pub metric: Option<String>,
    pub as_of: Option<NaiveDate>,
    pub window: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MixQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub fn resolve_platform<'a>(platforms: &'a [Platform], key: Option<&str>) -> Result<&'a Platform, String> {
    match key {
        Some(key) => find_platform(platforms, key).ok_or_else(|| format!("unknown platform: {}", key)),
        None => platforms
            .first()
            .ok_or_else(|| "no platforms configured".to_string()),
    }
}

pub fn resolve_rank_metric(key: Option<&str>) -> Result<RankMetric, String> {
    match key {
        Some(key) => RankMetric::from_str(key).ok_or_else(|| format!("unknown metric: {}", key)),
        None => Ok(RankMetric::Followers),
    }
}

pub fn resolve_metric(key: Option<&str>) -> Result<Metric, String> {
    match key {
        Some(key) => Metric::from_str(key).ok_or_else(|| format!("unknown metric: {}", key)),
        None => Ok(Metric::Followers),
    }
}

/// Fills missing bounds from the store's own span. `None` when the store
/// has no dated snapshots and no bounds were given.
pub fn resolve_range(
    store: &SnapshotStore,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Option<DateRange> {
    let span = store.date_span();
    let start = from.or(span.map(|span| span.start))?;
    let end = to.or(span.map(|span| span.end))?;
    Some(DateRange::new(start, end))
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub generation: u64,
    pub platform: String,
    pub platform_label: String,
    pub brand: String,
    pub metric: RankMetric,
    pub range: Option<DateRange>,
    pub entries: Vec<LeaderboardRow>,
    pub records: Vec<MetricRecord>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub entity_id: String,
    pub name: String,
    pub value: f64,
    pub display: String,
}

impl LeaderboardResponse {
    pub fn from_leaderboard(leaderboard: Leaderboard, platform: &Platform, generation: u64) -> Self {
        let records = leaderboard.records();
        let metric = leaderboard.metric;
        Self {
            generation,
            platform: platform.code.clone(),
            platform_label: platform.label.clone(),
            brand: platform.brand.clone(),
            metric,
            range: Some(leaderboard.range),
            entries: leaderboard
                .entries
                .into_iter()
                .map(|entry| LeaderboardRow::from_entry(entry, metric))
                .collect(),
            records,
        }
    }

    pub fn empty(platform: &Platform, metric: RankMetric, generation: u64) -> Self {
        Self {
            generation,
            platform: platform.code.clone(),
            platform_label: platform.label.clone(),
            brand: platform.brand.clone(),
            metric,
            range: None,
            entries: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl LeaderboardRow {
    fn from_entry(entry: LeaderboardEntry, metric: RankMetric) -> Self {
        Self {
            display: metric.format_value(entry.value),
            rank: entry.rank,
            entity_id: entry.entity_id,
            name: entry.name,
            value: entry.value,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub generation: u64,
    pub platform: String,
    pub metric: Metric,
    pub range: Option<DateRange>,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Serialize)]
pub struct MetricResponse {
    pub generation: u64,
    pub record: MetricRecord,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub generation: u64,
    pub as_of: Option<NaiveDate>,
    pub entries: Vec<RosterEntry>,
}

#[derive(Debug, Serialize)]
pub struct MixResponse {
    pub generation: u64,
    pub range: Option<DateRange>,
    pub platforms: Vec<PlatformShare>,
}

pub fn entity_record(
    store: &SnapshotStore,
    entity_id: &str,
    platform: &Platform,
    metric: &str,
    value: f64,
    as_of: Option<NaiveDate>,
) -> MetricRecord {
    MetricRecord {
        entity_id: entity_id.to_string(),
        name: store.name_of(entity_id).unwrap_or(entity_id).to_string(),
        platform: platform.code.clone(),
        metric: metric.to_string(),
        value,
        as_of,
    }
}
