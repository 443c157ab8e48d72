pub mod config;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod normalize;
pub mod platform;
pub mod record;
pub mod store;
pub mod synthetic;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use config::EngineConfig;
pub use error::MetricsError;
pub use normalize::normalize;
pub use platform::{default_platforms, Platform, PlatformExtras, PlatformKind};
pub use record::{RawRecord, Snapshot};
pub use store::SnapshotStore;

/// A per-snapshot quantity that growth and trend series can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Followers,
    Likes,
    Comments,
    Engagement,
}

impl Metric {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "followers" | "foll" => Some(Metric::Followers),
            "likes" => Some(Metric::Likes),
            "comments" => Some(Metric::Comments),
            "engagement" | "eng" => Some(Metric::Engagement),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Followers => "followers",
            Metric::Likes => "likes",
            Metric::Comments => "comments",
            Metric::Engagement => "engagement",
        }
    }
}

/// What a leaderboard orders entities by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMetric {
    Followers,
    Growth,
    Engagement,
}

impl RankMetric {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "followers" => Some(RankMetric::Followers),
            "growth" | "follower growth" | "follower_growth" => Some(RankMetric::Growth),
            "engagement" | "eng" => Some(RankMetric::Engagement),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RankMetric::Followers => "followers",
            RankMetric::Growth => "growth",
            RankMetric::Engagement => "engagement",
        }
    }

    pub fn format_value(self, value: f64) -> String {
        match self {
            RankMetric::Followers => format_number(value),
            RankMetric::Growth => format_signed(value),
            RankMetric::Engagement => format_percent(value),
        }
    }
}

/// Inclusive range of snapshot days. A range whose start is after its
/// end selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Flat projection of one derived value, stable for JSON consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub entity_id: String,
    pub name: String,
    pub platform: String,
    pub metric: String,
    pub value: f64,
    pub as_of: Option<NaiveDate>,
}

/// Whole-number count with thousands separators, e.g. `12,345`.
pub fn format_number(value: f64) -> String {
    let rounded = value.round().abs() as i64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value.round() < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Signed count for growth figures: `+200`, `-15`, `0`.
pub fn format_signed(value: f64) -> String {
    if value.round() > 0.0 {
        format!("+{}", format_number(value))
    } else {
        format_number(value)
    }
}

/// Formats a value that is already a percentage, e.g. `4.2%`.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
