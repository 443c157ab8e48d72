//! Ingestion boundary: raw log rows into typed snapshots.
//!
//! Raw rows are JSON objects keyed by the sheet's column names. Shared
//! columns are `StudentID`, `Name` and `Date`; per-platform columns use a
//! `{code}_` prefix (`IG_Followers`, `IG_LaPostLikes`, ...). Unknown
//! columns are ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::normalize::{clean_text, clean_text_opt, is_present, normalize};
use crate::platform::{Platform, PlatformExtras};
use crate::Metric;

pub const ENTITY_FIELD: &str = "StudentID";
pub const NAME_FIELD: &str = "Name";
pub const DATE_FIELD: &str = "Date";

pub type RawRecord = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestPost {
    pub date: Option<String>,
    pub caption: Option<String>,
    pub url: Option<String>,
    pub likes: Option<f64>,
    pub comments: Option<f64>,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub username: Option<String>,
    /// `None` when the cell was absent or blank; see [`PlatformStats::follower_count`].
    pub followers: Option<f64>,
    pub post: LatestPost,
    pub extras: PlatformExtras,
}

impl PlatformStats {
    pub fn follower_count(&self) -> f64 {
        self.followers.unwrap_or(0.0)
    }

    pub fn is_linked(&self) -> bool {
        self.username.is_some()
    }

    /// Engagement ratio as a percentage; zero followers divide by one.
    pub fn engagement_pct(&self) -> f64 {
        let likes = self.post.likes.unwrap_or(0.0);
        likes / self.follower_count().max(1.0) * 100.0
    }

    /// The metric's value in this row, `None` when the row did not record it.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Followers => self.followers,
            Metric::Likes => self.post.likes,
            Metric::Comments => self.post.comments,
            Metric::Engagement => {
                if self.followers.is_some() || self.post.likes.is_some() {
                    Some(self.engagement_pct())
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub entity_id: String,
    pub name: String,
    /// Day the observation was taken; `None` when `Date` could not be parsed.
    pub date: Option<NaiveDate>,
    pub date_raw: String,
    /// Position of the source row in the raw log.
    pub arrival: usize,
    pub platforms: BTreeMap<String, PlatformStats>,
}

impl Snapshot {
    pub fn from_raw(record: &RawRecord, arrival: usize, platforms: &[Platform]) -> Option<Self> {
        let entity_id = clean_text(record.get(ENTITY_FIELD));
        if entity_id.is_empty() {
            return None;
        }

        let date_raw = clean_text(record.get(DATE_FIELD));
        let date = parse_snapshot_date(&date_raw);

        let platforms = platforms
            .iter()
            .filter_map(|platform| {
                extract_platform(record, platform).map(|stats| (platform.code.clone(), stats))
            })
            .collect();

        Some(Self {
            entity_id,
            name: clean_text(record.get(NAME_FIELD)),
            date,
            date_raw,
            arrival,
            platforms,
        })
    }

    pub fn platform(&self, code: &str) -> Option<&PlatformStats> {
        self.platforms.get(code)
    }

    pub fn metric(&self, code: &str, metric: Metric) -> Option<f64> {
        self.platform(code).and_then(|stats| stats.metric(metric))
    }

    /// Platform codes with a username in this row, in platform-code order.
    pub fn linked_platforms(&self) -> Vec<&str> {
        self.platforms
            .iter()
            .filter(|(_, stats)| stats.is_linked())
            .map(|(code, _)| code.as_str())
            .collect()
    }
}

fn extract_platform(record: &RawRecord, platform: &Platform) -> Option<PlatformStats> {
    let prefix = format!("{}_", platform.code);
    if !record.keys().any(|key| key.starts_with(&prefix)) {
        return None;
    }

    let number = |suffix: &str| {
        let value = record.get(&platform.field(suffix));
        if is_present(value) {
            value.map(normalize)
        } else {
            None
        }
    };
    let text = |suffix: &str| clean_text_opt(record.get(&platform.field(suffix)));

    Some(PlatformStats {
        username: text("Username"),
        followers: number("Followers"),
        post: LatestPost {
            date: text("LaPostDate"),
            caption: text("LaPostCaption"),
            url: text("LaPostURL"),
            likes: number("LaPostLikes"),
            comments: number("LaPostComments"),
            preview_url: text("LaPostPreview"),
        },
        extras: platform.kind().extract(&platform.code, record),
    })
}

/// Resolves a snapshot date to day granularity.
///
/// Accepts RFC 3339 / ISO-8601 timestamps (with or without a trailing
/// zone marker), `YYYY-MM-DD HH:MM:SS`, bare dates (only the first ten
/// characters are read) and `MM/DD/YYYY`. Anything else is undated.
pub fn parse_snapshot_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.date_naive());
    }

    let without_zone = trimmed.trim_end_matches('Z');
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(without_zone, fmt) {
            return Some(parsed.date());
        }
    }

    if let Some(head) = trimmed.get(..10) {
        if let Ok(parsed) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            return Some(parsed);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%m/%d/%Y").ok()
}
