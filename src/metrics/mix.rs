use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::store::SnapshotStore;
use crate::DateRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformShare {
    pub code: String,
    pub label: String,
    pub followers: f64,
    /// Fraction of the total across all platforms, `0.0` when the total is zero.
    pub share: f64,
}

/// Total followers per platform over each entity's latest snapshot in `range`.
pub fn platform_mix(store: &SnapshotStore, platforms: &[Platform], range: DateRange) -> Vec<PlatformShare> {
    let scoped = store.within(range);
    let latest: Vec<_> = scoped
        .entities()
        .iter()
        .filter_map(|entity_id| scoped.latest_at_or_before(entity_id, range.end))
        .collect();

    let mut shares: Vec<PlatformShare> = platforms
        .iter()
        .map(|platform| PlatformShare {
            code: platform.code.clone(),
            label: platform.label.clone(),
            followers: latest
                .iter()
                .filter_map(|snapshot| snapshot.platform(&platform.code))
                .map(|stats| stats.follower_count())
                .sum(),
            share: 0.0,
        })
        .collect();

    let total: f64 = shares.iter().map(|share| share.followers).sum();
    if total > 0.0 {
        for share in shares.iter_mut() {
            share.share = share.followers / total;
        }
    }

    shares
}
