use chrono::NaiveDate;

use crate::store::SnapshotStore;

/// Likes on the latest post as a percentage of followers, read from the
/// entity's latest snapshot at or before `as_of`.
///
/// Zero followers divide by one, so a follower-less account with likes
/// reports a large percentage rather than failing. Missing history is `0.0`.
pub fn engagement_pct(
    store: &SnapshotStore,
    entity_id: &str,
    platform: &str,
    as_of: NaiveDate,
) -> f64 {
    store
        .latest_at_or_before(entity_id, as_of)
        .and_then(|snapshot| snapshot.platform(platform))
        .map(|stats| stats.engagement_pct())
        .unwrap_or(0.0)
}
