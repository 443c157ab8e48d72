use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::MetricsError;
use crate::metrics::{GrowthConfig, LeaderboardConfig, SeriesConfig};
use crate::platform::{default_platforms, Platform};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub caption_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { caption_limit: 110 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    pub cache_ttl_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            cache_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub growth: GrowthConfig,
    pub leaderboard: LeaderboardConfig,
    pub series: SeriesConfig,
    pub feed: FeedConfig,
    pub source: SourceConfig,
    pub platforms: Vec<Platform>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            growth: GrowthConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            series: SeriesConfig::default(),
            feed: FeedConfig::default(),
            source: SourceConfig::default(),
            platforms: default_platforms(),
        }
    }
}

impl EngineConfig {
    /// Reads the TOML file (if present) and applies environment overrides.
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), MetricsError> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| MetricsError::io(format!("config {}", path.display()), err))?;
                Self::from_toml_str(&contents)?
            }
            _ => EngineConfig::default(),
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, MetricsError> {
        let mut config: EngineConfig = toml::from_str(contents)?;
        if config.platforms.is_empty() {
            config.platforms = default_platforms();
        }
        Ok(config)
    }

    pub fn write(&self, path: &Path) -> Result<(), MetricsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| MetricsError::io("config dir", err))?;
        }
        let payload = toml::to_string_pretty(self)?;
        std::fs::write(path, payload).map_err(|err| MetricsError::io("config file", err))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Some(value) = env_parse::<u32>("GROWTH_WINDOW_DAYS") {
            self.growth.window_days = value;
        }
        if let Some(value) = env_parse::<usize>("LEADERBOARD_SIZE") {
            self.leaderboard.size = value;
        }
        if let Some(value) = env_parse::<u32>("LEADERBOARD_GROWTH_WINDOW_DAYS") {
            self.leaderboard.growth_window_days = value;
        }
        if let Some(path) = env_string("SNAPSHOT_SOURCE_PATH") {
            self.source.path = Some(PathBuf::from(path));
        }
        if let Some(url) = env_string("SNAPSHOT_SOURCE_URL") {
            self.source.url = Some(url);
        }
        if let Some(value) = env_parse::<u64>("SNAPSHOT_CACHE_TTL_SECS") {
            self.source.cache_ttl_secs = value;
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|value| value.trim().parse::<T>().ok())
}

fn default_config_path() -> Option<PathBuf> {
    env_string("METRICS_CONFIG_PATH")
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/metrics.toml")))
}
