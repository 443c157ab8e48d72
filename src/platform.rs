use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::{is_present, normalize};

/// Which platform-specific extras a platform's rows may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    #[default]
    Standard,
    LinkedIn,
    YouTube,
}

impl PlatformKind {
    pub fn from_code(code: &str) -> Self {
        match code.to_uppercase().as_str() {
            "LI" => PlatformKind::LinkedIn,
            "YT" => PlatformKind::YouTube,
            _ => PlatformKind::Standard,
        }
    }

    pub fn extract(self, prefix: &str, row: &Map<String, Value>) -> PlatformExtras {
        let field = |suffix: &str| {
            let value = row.get(&format!("{}_{}", prefix, suffix));
            if is_present(value) {
                value.map(normalize)
            } else {
                None
            }
        };

        match self {
            PlatformKind::Standard => PlatformExtras::Standard,
            PlatformKind::LinkedIn => PlatformExtras::LinkedIn {
                connections: field("Connections"),
            },
            PlatformKind::YouTube => PlatformExtras::YouTube {
                channel_views: field("ChannelViews"),
                subscribers_hidden: row
                    .get(&format!("{}_SubscribersHidden", prefix))
                    .map(|value| match value {
                        Value::Bool(flag) => *flag,
                        Value::String(text) => {
                            matches!(text.trim().to_lowercase().as_str(), "true" | "yes" | "1")
                        }
                        _ => false,
                    })
                    .unwrap_or(false),
            },
        }
    }
}

/// Platform-specific optional attributes of a snapshot row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlatformExtras {
    #[default]
    Standard,
    LinkedIn {
        connections: Option<f64>,
    },
    YouTube {
        channel_views: Option<f64>,
        subscribers_hidden: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Field-name prefix in the raw log, e.g. `IG` for `IG_Followers`.
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub kind: Option<PlatformKind>,
}

impl Platform {
    pub fn new(code: &str, label: &str, brand: &str, icon: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
            brand: brand.to_string(),
            icon: icon.to_string(),
            kind: None,
        }
    }

    pub fn kind(&self) -> PlatformKind {
        self.kind.unwrap_or_else(|| PlatformKind::from_code(&self.code))
    }

    pub fn field(&self, suffix: &str) -> String {
        format!("{}_{}", self.code, suffix)
    }
}

const ICON_BASE: &str = "https://cdn.jsdelivr.net/gh/simple-icons/simple-icons/icons";

pub fn default_platforms() -> Vec<Platform> {
    vec![
        Platform::new("IG", "Instagram", "#E1306C", &format!("{}/instagram.svg", ICON_BASE)),
        Platform::new("TT", "TikTok", "#232323", &format!("{}/tiktok.svg", ICON_BASE)),
        Platform::new("YT", "YouTube", "#FF0000", &format!("{}/youtube.svg", ICON_BASE)),
        Platform::new("TH", "Threads", "#A59F9F", &format!("{}/threads.svg", ICON_BASE)),
        Platform::new("LI", "LinkedIn", "#126BC4", &format!("{}/linkedin.svg", ICON_BASE)),
    ]
}

/// Looks a platform up by code or label, case-insensitively.
pub fn find_platform<'a>(platforms: &'a [Platform], key: &str) -> Option<&'a Platform> {
    let key = key.trim();
    platforms
        .iter()
        .find(|platform| platform.code.eq_ignore_ascii_case(key))
        .or_else(|| {
            platforms
                .iter()
                .find(|platform| platform.label.eq_ignore_ascii_case(key))
        })
}
