use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::store::SnapshotStore;
use crate::Metric;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    pub window_days: u32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self { window_days: 7 }
    }
}

#[derive(Debug, Clone)]
pub struct GrowthCalculator {
    config: GrowthConfig,
}

impl GrowthCalculator {
    pub fn new(config: GrowthConfig) -> Self {
        Self { config }
    }

    pub fn growth(
        &self,
        store: &SnapshotStore,
        entity_id: &str,
        platform: &str,
        metric: Metric,
        as_of: NaiveDate,
    ) -> f64 {
        growth(store, entity_id, platform, metric, as_of, self.config.window_days)
    }
}

/// Signed change of `metric` over a trailing window ending at `as_of`.
///
/// The end point is the latest snapshot at or before `as_of` that recorded
/// the metric. The start point is the latest such snapshot at or before
/// `end - window_days`, falling back to the earliest one in `store`. No
/// history yields `0.0`, and so does a single snapshot.
pub fn growth(
    store: &SnapshotStore,
    entity_id: &str,
    platform: &str,
    metric: Metric,
    as_of: NaiveDate,
    window_days: u32,
) -> f64 {
    let points: Vec<(NaiveDate, f64)> = store
        .all_at_or_before(entity_id, platform, as_of)
        .into_iter()
        .filter_map(|snapshot| Some((snapshot.date?, snapshot.metric(platform, metric)?)))
        .collect();

    let Some(&(end_date, end_value)) = points.last() else {
        return 0.0;
    };

    let start = end_date
        .checked_sub_days(Days::new(u64::from(window_days)))
        .and_then(|cutoff| points.iter().rev().find(|(day, _)| *day <= cutoff))
        .or_else(|| points.first());

    match start {
        Some(&(_, start_value)) => end_value - start_value,
        None => 0.0,
    }
}
