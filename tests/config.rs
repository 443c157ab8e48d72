use social_metrics::platform::{find_platform, PlatformKind};
use social_metrics::EngineConfig;

#[test]
fn empty_config_uses_defaults() {
    let config = EngineConfig::from_toml_str("").unwrap();
    assert_eq!(config.growth.window_days, 7);
    assert_eq!(config.leaderboard.size, 10);
    assert_eq!(config.leaderboard.growth_window_days, 7);
    assert_eq!(config.series.top_entities, 5);
    assert_eq!(config.feed.caption_limit, 110);
    assert_eq!(config.source.cache_ttl_secs, 300);
    assert!(config.source.path.is_none());

    let codes: Vec<&str> = config.platforms.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["IG", "TT", "YT", "TH", "LI"]);
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let config = EngineConfig::from_toml_str(
        r#"
[growth]
window_days = 14

[leaderboard]
size = 3

[source]
path = "data/log.json"
"#,
    )
    .unwrap();

    assert_eq!(config.growth.window_days, 14);
    assert_eq!(config.leaderboard.size, 3);
    assert_eq!(config.leaderboard.growth_window_days, 7);
    assert_eq!(config.source.path.as_deref(), Some(std::path::Path::new("data/log.json")));
    assert_eq!(config.source.cache_ttl_secs, 300);
    assert_eq!(config.platforms.len(), 5);
}

#[test]
fn custom_platforms_replace_the_defaults() {
    let config = EngineConfig::from_toml_str(
        r##"
[[platforms]]
code = "FB"
label = "Facebook"
brand = "#1877F2"

[[platforms]]
code = "VID"
label = "Video"
kind = "youtube"
"##,
    )
    .unwrap();

    assert_eq!(config.platforms.len(), 2);
    assert_eq!(config.platforms[0].kind(), PlatformKind::Standard);
    assert_eq!(config.platforms[1].kind(), PlatformKind::YouTube);
    assert!(config.platforms[1].icon.is_empty());
    assert_eq!(find_platform(&config.platforms, "facebook").map(|p| p.code.as_str()), Some("FB"));
    assert_eq!(find_platform(&config.platforms, "vid").map(|p| p.label.as_str()), Some("Video"));
    assert!(find_platform(&config.platforms, "IG").is_none());
}

#[test]
fn malformed_toml_is_an_error() {
    assert!(EngineConfig::from_toml_str("[growth\nwindow_days = 3").is_err());
    assert!(EngineConfig::from_toml_str("[growth]\nwindow_days = \"seven\"").is_err());
}

#[test]
fn config_round_trips_through_a_file() {
    let dir = std::env::temp_dir().join(format!("social-metrics-config-{}", std::process::id()));
    let path = dir.join("metrics.toml");

    let mut config = EngineConfig::default();
    config.feed.caption_limit = 42;
    config.write(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let reloaded = EngineConfig::from_toml_str(&contents).unwrap();
    assert_eq!(reloaded.feed.caption_limit, 42);
    assert_eq!(reloaded.platforms, config.platforms);

    std::fs::remove_dir_all(&dir).ok();
}
