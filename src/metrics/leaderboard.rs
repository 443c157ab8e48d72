use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::metrics::engagement::engagement_pct;
use crate::metrics::growth::growth;
use crate::store::SnapshotStore;
use crate::{DateRange, Metric, MetricRecord, RankMetric};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub size: usize,
    /// Trailing window for the growth metric. It does not follow the
    /// selected date range.
    pub growth_window_days: u32,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            size: 10,
            growth_window_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    pub entity_id: String,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub platform: String,
    pub metric: RankMetric,
    pub range: DateRange,
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn records(&self) -> Vec<MetricRecord> {
        self.entries
            .iter()
            .map(|entry| MetricRecord {
                entity_id: entry.entity_id.clone(),
                name: entry.name.clone(),
                platform: self.platform.clone(),
                metric: self.metric.label().to_string(),
                value: entry.value,
                as_of: Some(self.range.end),
            })
            .collect()
    }

    pub fn entity_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.entity_id.clone())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct LeaderboardRanker {
    config: LeaderboardConfig,
}

impl LeaderboardRanker {
    pub fn new(config: LeaderboardConfig) -> Self {
        Self { config }
    }

    pub fn default_size(&self) -> usize {
        self.config.size
    }

    /// Ranks every entity with a snapshot in `range` and keeps the top `top_n`.
    ///
    /// Values are computed on the range-restricted store with the range end
    /// as the reference day. Sorting is descending and stable, so tied
    /// entities keep the order in which they first appeared in the raw log.
    pub fn rank(
        &self,
        store: &SnapshotStore,
        platform: &str,
        metric: RankMetric,
        range: DateRange,
        top_n: usize,
    ) -> Leaderboard {
        let scoped = store.within(range);
        let as_of = range.end;

        let mut entries: Vec<LeaderboardEntry> = scoped
            .entities()
            .iter()
            .map(|entity_id| {
                let value = match metric {
                    RankMetric::Followers => latest_followers(&scoped, entity_id, platform, range),
                    RankMetric::Growth => growth(
                        &scoped,
                        entity_id,
                        platform,
                        Metric::Followers,
                        as_of,
                        self.config.growth_window_days,
                    ),
                    RankMetric::Engagement => engagement_pct(&scoped, entity_id, platform, as_of),
                };
                LeaderboardEntry {
                    rank: 0,
                    entity_id: entity_id.clone(),
                    name: scoped.name_of(entity_id).unwrap_or(entity_id).to_string(),
                    value,
                }
            })
            .collect();

        entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
        entries.truncate(top_n);
        for (idx, entry) in entries.iter_mut().enumerate() {
            entry.rank = idx + 1;
        }

        tracing::debug!(
            platform,
            metric = metric.label(),
            entries = entries.len(),
            "leaderboard ranked"
        );

        Leaderboard {
            platform: platform.to_string(),
            metric,
            range,
            entries,
        }
    }
}

/// Follower count in the entity's latest snapshot up to the range end. A
/// blank cell counts as zero, matching what the engagement ranking divides by.
fn latest_followers(store: &SnapshotStore, entity_id: &str, platform: &str, range: DateRange) -> f64 {
    store
        .latest_at_or_before(entity_id, range.end)
        .and_then(|snapshot| snapshot.platform(platform))
        .map(|stats| stats.follower_count())
        .unwrap_or(0.0)
}
