use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::metrics::leaderboard::LeaderboardRanker;
use crate::store::SnapshotStore;
use crate::{DateRange, Metric, RankMetric};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// How many leaderboard leaders to chart when no entities are chosen.
    pub top_entities: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self { top_entities: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub entity_id: String,
    pub name: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// Every snapshot of the given entities inside `range`, one point each.
///
/// Points are grouped per entity in the order the ids are given (repeats
/// ignored) and ascend by day within each entity. Snapshots that did not
/// record the metric plot as `0.0`.
pub fn series(
    store: &SnapshotStore,
    entity_ids: &[String],
    platform: &str,
    metric: Metric,
    range: DateRange,
) -> Vec<SeriesPoint> {
    if range.is_empty() {
        return Vec::new();
    }

    let mut seen: Vec<&str> = Vec::new();
    let mut points = Vec::new();

    for entity_id in entity_ids {
        if seen.contains(&entity_id.as_str()) {
            continue;
        }
        seen.push(entity_id);

        for snapshot in store.all_at_or_before(entity_id, platform, range.end) {
            let Some(date) = snapshot.date.filter(|day| range.contains(*day)) else {
                continue;
            };
            points.push(SeriesPoint {
                entity_id: entity_id.clone(),
                name: snapshot.name.clone(),
                date,
                value: snapshot.metric(platform, metric).unwrap_or(0.0),
            });
        }
    }

    points
}

/// Entities to chart: the requested ids, or when none are given the top
/// `series.top_entities` of the followers leaderboard for the range.
pub fn trend_entities(
    store: &SnapshotStore,
    requested: &[String],
    platform: &str,
    range: DateRange,
    config: &EngineConfig,
) -> Vec<String> {
    if !requested.is_empty() {
        return requested.to_vec();
    }
    LeaderboardRanker::new(config.leaderboard.clone())
        .rank(store, platform, RankMetric::Followers, range, config.series.top_entities)
        .entity_ids()
}
