//! Per-entity feed cards and roster lookup for the dashboard views.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::metrics::GrowthCalculator;
use crate::normalize::{format_post_date, truncate_caption};
use crate::platform::PlatformExtras;
use crate::record::Snapshot;
use crate::store::SnapshotStore;
use crate::Metric;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCard {
    pub platform: String,
    pub label: String,
    pub brand: String,
    pub icon: String,
    pub username: String,
    /// Follower count in the current snapshot.
    pub followers: f64,
    pub growth: f64,
    pub engagement: f64,
    pub post_date: String,
    pub caption: String,
    pub post_url: Option<String>,
    pub preview_url: Option<String>,
    pub likes: f64,
    pub comments: f64,
    pub extras: PlatformExtras,
    /// Set on the platform with the most followers, when that count is positive.
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFeed {
    pub entity_id: String,
    pub name: String,
    pub initials: String,
    pub as_of: NaiveDate,
    pub cards: Vec<FeedCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub entity_id: String,
    pub name: String,
    pub initials: String,
}

/// Builds the linked-platform cards for an entity at the store's current date.
///
/// Returns `None` when the entity has no snapshot on that date.
pub fn entity_feed(store: &SnapshotStore, entity_id: &str, config: &EngineConfig) -> Option<EntityFeed> {
    let current = store.latest_for(entity_id)?;
    let as_of = current.date?;

    let primary = primary_platform(current, config);
    let growth = GrowthCalculator::new(config.growth.clone());

    let cards = config
        .platforms
        .iter()
        .filter_map(|platform| {
            let stats = current.platform(&platform.code)?;
            let username = stats.username.clone()?;

            // Post details come from the latest row that recorded followers.
            let history = store.all_at_or_before(entity_id, &platform.code, as_of);
            let latest = history
                .iter()
                .rev()
                .find(|snapshot| snapshot.metric(&platform.code, Metric::Followers).is_some())
                .and_then(|snapshot| snapshot.platform(&platform.code));

            let (engagement, post_date, caption, post_url, preview_url, likes, comments) = match latest {
                Some(latest) => (
                    latest.engagement_pct(),
                    latest.post.date.as_deref().map(format_post_date).unwrap_or_default(),
                    latest
                        .post
                        .caption
                        .as_deref()
                        .map(|caption| truncate_caption(caption, config.feed.caption_limit))
                        .unwrap_or_default(),
                    latest.post.url.clone(),
                    latest.post.preview_url.clone(),
                    latest.post.likes.unwrap_or(0.0),
                    latest.post.comments.unwrap_or(0.0),
                ),
                None => (0.0, String::new(), String::new(), None, None, 0.0, 0.0),
            };

            Some(FeedCard {
                platform: platform.code.clone(),
                label: platform.label.clone(),
                brand: platform.brand.clone(),
                icon: platform.icon.clone(),
                username,
                followers: stats.follower_count(),
                growth: growth.growth(store, entity_id, &platform.code, Metric::Followers, as_of),
                engagement,
                post_date,
                caption,
                post_url,
                preview_url,
                likes,
                comments,
                extras: stats.extras.clone(),
                primary: primary.as_deref() == Some(platform.code.as_str()),
            })
        })
        .collect();

    Some(EntityFeed {
        entity_id: current.entity_id.clone(),
        name: current.name.clone(),
        initials: initials(&current.name),
        as_of,
        cards,
    })
}

fn primary_platform(current: &Snapshot, config: &EngineConfig) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for platform in &config.platforms {
        let followers = current
            .platform(&platform.code)
            .map(|stats| stats.follower_count())
            .unwrap_or(0.0);
        if best.map_or(true, |(_, top)| followers > top) {
            best = Some((platform.code.as_str(), followers));
        }
    }
    best.filter(|(_, followers)| *followers > 0.0)
        .map(|(code, _)| code.to_string())
}

/// Entities in the current snapshot whose name contains `query`,
/// case-insensitively. A blank query lists everyone with a name.
pub fn search_roster(store: &SnapshotStore, query: &str) -> Vec<RosterEntry> {
    let needle = query.trim().to_lowercase();
    store
        .current_snapshots()
        .into_iter()
        .filter(|snapshot| !snapshot.name.trim().is_empty())
        .filter(|snapshot| needle.is_empty() || snapshot.name.to_lowercase().contains(&needle))
        .map(|snapshot| RosterEntry {
            entity_id: snapshot.entity_id.clone(),
            name: snapshot.name.clone(),
            initials: initials(&snapshot.name),
        })
        .collect()
}

/// Up to two upper-cased initials, e.g. `"ada lovelace"` -> `"AL"`.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters.to_uppercase()
    }
}
