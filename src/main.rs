mod api;
mod server;
mod source;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use social_metrics::feed::{entity_feed, search_roster};
use social_metrics::metrics::{
    engagement_pct, growth, platform_mix, series, trend_entities, LeaderboardRanker,
};
use social_metrics::platform::find_platform;
use social_metrics::synthetic::{generate_synthetic_log, SyntheticConfig};
use social_metrics::{
    format_float, format_number, format_percent, format_signed, DateRange, EngineConfig, Metric,
    MetricRecord, MetricsError, Platform, RankMetric, SnapshotStore,
};

use crate::api::entity_record;
use crate::source::SnapshotSource;

#[derive(Parser)]
#[command(name = "social-metrics", about = "Creator social metrics engine")]
struct Cli {
    /// TOML config file (defaults to METRICS_CONFIG_PATH or config/metrics.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Top entities for one platform and metric.
    Leaderboard(LeaderboardArgs),
    /// Follower (or other metric) change over a trailing window.
    Growth(EntityMetricArgs),
    /// Latest-post likes as a percentage of followers.
    Engagement(EntityMetricArgs),
    /// Dated points for trend charts.
    Series(SeriesArgs),
    /// Linked-platform cards for one entity at the current date.
    Feed(FeedArgs),
    /// Search the current roster by name.
    Roster(RosterArgs),
    /// Followers per platform across the latest snapshots.
    Mix(MixArgs),
    /// Write a synthetic raw snapshot log.
    Generate(GenerateArgs),
    /// Serve the JSON dashboard API.
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Raw snapshot log (JSON array of rows); `-` reads stdin.
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct RangeArgs {
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
struct LeaderboardArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    range: RangeArgs,
    #[arg(long, default_value = "IG")]
    platform: String,
    #[arg(long, default_value = "followers")]
    metric: String,
    #[arg(long)]
    top: Option<usize>,
}

#[derive(Args, Debug, Clone)]
struct EntityMetricArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(long)]
    entity: String,
    #[arg(long, default_value = "IG")]
    platform: String,
    #[arg(long, default_value = "followers")]
    metric: String,
    #[arg(long)]
    as_of: Option<NaiveDate>,
    #[arg(long)]
    window: Option<u32>,
}

#[derive(Args, Debug, Clone)]
struct SeriesArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    range: RangeArgs,
    /// Entity to chart; repeat for several. Omit to chart the follower leaders.
    #[arg(long = "entity")]
    entities: Vec<String>,
    #[arg(long, default_value = "IG")]
    platform: String,
    #[arg(long, default_value = "followers")]
    metric: String,
}

#[derive(Args, Debug, Clone)]
struct FeedArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(long)]
    entity: String,
}

#[derive(Args, Debug, Clone)]
struct RosterArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(long, default_value = "")]
    search: String,
}

#[derive(Args, Debug, Clone)]
struct MixArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    range: RangeArgs,
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    #[arg(long, default_value_t = 12)]
    students: usize,
    #[arg(long, default_value_t = 30)]
    days: u32,
    #[arg(long, default_value_t = 7)]
    seed: u64,
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Output file; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long, default_value = "web/dist")]
    web_root: String,
    #[arg(long)]
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), MetricsError> {
    let cli = Cli::parse();
    let (config, config_path) = EngineConfig::load(cli.config)?;
    tracing::debug!(config = ?config_path, "configuration loaded");

    match cli.command {
        Command::Leaderboard(args) => run_leaderboard(args, &config).await,
        Command::Growth(args) => run_growth(args, &config).await,
        Command::Engagement(args) => run_engagement(args, &config).await,
        Command::Series(args) => run_series(args, &config).await,
        Command::Feed(args) => run_feed(args, &config).await,
        Command::Roster(args) => run_roster(args, &config).await,
        Command::Mix(args) => run_mix(args, &config).await,
        Command::Generate(args) => run_generate(args, &config),
        Command::Serve(args) => server::serve(args, config).await,
    }
}

async fn load_store(args: &SourceArgs, config: &EngineConfig) -> Result<SnapshotStore, MetricsError> {
    let source = SnapshotSource::resolve(args.input.clone(), &config.source)?;
    let records = source.load(&reqwest::Client::new()).await?;
    Ok(SnapshotStore::ingest(&records, &config.platforms))
}

fn platform_arg<'a>(config: &'a EngineConfig, key: &str) -> Result<&'a Platform, MetricsError> {
    find_platform(&config.platforms, key)
        .ok_or_else(|| MetricsError::InvalidArgument(format!("unknown platform: {}", key)))
}

fn metric_arg(key: &str) -> Result<Metric, MetricsError> {
    Metric::from_str(key).ok_or_else(|| MetricsError::InvalidArgument(format!("unknown metric: {}", key)))
}

fn range_arg(store: &SnapshotStore, range: &RangeArgs) -> Option<DateRange> {
    api::resolve_range(store, range.from, range.to)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), MetricsError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_leaderboard(args: LeaderboardArgs, config: &EngineConfig) -> Result<(), MetricsError> {
    let platform = platform_arg(config, &args.platform)?;
    let metric = RankMetric::from_str(&args.metric)
        .ok_or_else(|| MetricsError::InvalidArgument(format!("unknown metric: {}", args.metric)))?;
    let store = load_store(&args.source, config).await?;

    let ranker = LeaderboardRanker::new(config.leaderboard.clone());
    let Some(range) = range_arg(&store, &args.range) else {
        if args.source.json {
            return print_json(&Vec::<MetricRecord>::new());
        }
        println!("No dated snapshots in the log.");
        return Ok(());
    };
    let top_n = args.top.unwrap_or(ranker.default_size());
    let leaderboard = ranker.rank(&store, &platform.code, metric, range, top_n);

    if args.source.json {
        return print_json(&leaderboard.records());
    }

    println!(
        "{} {} leaderboard ({} to {})",
        platform.label,
        metric.label(),
        range.start,
        range.end
    );
    if leaderboard.entries.is_empty() {
        println!("No data in range.");
    }
    for entry in &leaderboard.entries {
        println!(
            "{:>3}. {:<28} {:>12}",
            entry.rank,
            entry.name,
            metric.format_value(entry.value)
        );
    }
    Ok(())
}

async fn run_growth(args: EntityMetricArgs, config: &EngineConfig) -> Result<(), MetricsError> {
    let platform = platform_arg(config, &args.platform)?;
    let metric = metric_arg(&args.metric)?;
    let store = load_store(&args.source, config).await?;

    let as_of = args.as_of.or_else(|| store.current_date());
    let window = args.window.unwrap_or(config.growth.window_days);
    let value = as_of
        .map(|day| growth(&store, &args.entity, &platform.code, metric, day, window))
        .unwrap_or(0.0);

    let record = entity_record(&store, &args.entity, platform, "growth", value, as_of);
    if args.source.json {
        return print_json(&record);
    }
    println!(
        "{} {} {} growth over {} days: {}",
        record.name,
        platform.label,
        metric.label(),
        window,
        format_signed(value)
    );
    Ok(())
}

async fn run_engagement(args: EntityMetricArgs, config: &EngineConfig) -> Result<(), MetricsError> {
    let platform = platform_arg(config, &args.platform)?;
    let store = load_store(&args.source, config).await?;

    let as_of = args.as_of.or_else(|| store.current_date());
    let value = as_of
        .map(|day| engagement_pct(&store, &args.entity, &platform.code, day))
        .unwrap_or(0.0);

    let record = entity_record(&store, &args.entity, platform, "engagement", value, as_of);
    if args.source.json {
        return print_json(&record);
    }
    println!(
        "{} {} engagement: {}",
        record.name,
        platform.label,
        format_percent(value)
    );
    Ok(())
}

async fn run_series(args: SeriesArgs, config: &EngineConfig) -> Result<(), MetricsError> {
    let platform = platform_arg(config, &args.platform)?;
    let metric = metric_arg(&args.metric)?;
    let store = load_store(&args.source, config).await?;

    let points = match range_arg(&store, &args.range) {
        Some(range) => {
            let entity_ids = trend_entities(&store, &args.entities, &platform.code, range, config);
            series(&store, &entity_ids, &platform.code, metric, range)
        }
        None => Vec::new(),
    };

    if args.source.json {
        return print_json(&points);
    }
    if points.is_empty() {
        println!("No time series data for this selection.");
    }
    for point in &points {
        println!(
            "{:<10} {:<24} {} {:>12}",
            point.entity_id,
            point.name,
            point.date,
            format_float(point.value, if metric == Metric::Engagement { 2 } else { 0 })
        );
    }
    Ok(())
}

async fn run_feed(args: FeedArgs, config: &EngineConfig) -> Result<(), MetricsError> {
    let store = load_store(&args.source, config).await?;
    let Some(feed) = entity_feed(&store, &args.entity, config) else {
        return Err(MetricsError::InvalidArgument(format!(
            "no current snapshot for {}",
            args.entity
        )));
    };

    if args.source.json {
        return print_json(&feed);
    }

    println!("{} [{}] as of {}", feed.name, feed.initials, feed.as_of);
    for card in &feed.cards {
        let marker = if card.primary { "*" } else { " " };
        println!(
            "{} {:<10} @{:<24} {:>10} followers  {:>8}  {:>7}",
            marker,
            card.label,
            card.username,
            format_number(card.followers),
            format_signed(card.growth),
            format_percent(card.engagement)
        );
        if !card.post_date.is_empty() || !card.caption.is_empty() {
            println!("    {}  {}", card.post_date, card.caption);
        }
        if card.likes > 0.0 || card.comments > 0.0 {
            println!(
                "    likes {} | comments {}",
                format_number(card.likes),
                format_number(card.comments)
            );
        }
    }
    Ok(())
}

async fn run_roster(args: RosterArgs, config: &EngineConfig) -> Result<(), MetricsError> {
    let store = load_store(&args.source, config).await?;
    let entries = search_roster(&store, &args.search);
    if args.source.json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No students found.");
    }
    for entry in &entries {
        println!("{:<4} {:<10} {}", entry.initials, entry.entity_id, entry.name);
    }
    Ok(())
}

async fn run_mix(args: MixArgs, config: &EngineConfig) -> Result<(), MetricsError> {
    let store = load_store(&args.source, config).await?;
    let shares = match range_arg(&store, &args.range) {
        Some(range) => platform_mix(&store, &config.platforms, range),
        None => Vec::new(),
    };
    if args.source.json {
        return print_json(&shares);
    }
    for share in &shares {
        println!(
            "{:<10} {:>12} {:>7}",
            share.label,
            format_number(share.followers),
            format_percent(share.share * 100.0)
        );
    }
    Ok(())
}

fn run_generate(args: GenerateArgs, config: &EngineConfig) -> Result<(), MetricsError> {
    let mut synthetic = SyntheticConfig {
        students: args.students,
        days: args.days,
        seed: args.seed,
        ..SyntheticConfig::default()
    };
    if let Some(start) = args.start {
        synthetic.start = start;
    }

    let rows = generate_synthetic_log(&synthetic, &config.platforms);
    let payload = serde_json::to_string_pretty(&rows)?;
    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|err| MetricsError::io("output dir", err))?;
            }
            std::fs::write(&path, payload)
                .map_err(|err| MetricsError::io(format!("output {}", path.display()), err))?;
            eprintln!("Wrote {} rows to {}", rows.len(), path.display());
        }
        None => println!("{}", payload),
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
