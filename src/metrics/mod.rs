pub mod engagement;
pub mod growth;
pub mod leaderboard;
pub mod mix;
pub mod series;

pub use engagement::engagement_pct;
pub use growth::{growth, GrowthCalculator, GrowthConfig};
pub use leaderboard::{Leaderboard, LeaderboardConfig, LeaderboardEntry, LeaderboardRanker};
pub use mix::{platform_mix, PlatformShare};
pub use series::{series, trend_entities, SeriesConfig, SeriesPoint};
