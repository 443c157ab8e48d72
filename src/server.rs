use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::services::{ServeDir, ServeFile};

use crate::api::{
    entity_record, resolve_metric, resolve_platform, resolve_range, resolve_rank_metric, EntityMetricQuery,
    LeaderboardQuery, LeaderboardResponse, MetricResponse, MixQuery, MixResponse, RosterQuery,
    RosterResponse, SeriesQuery, SeriesResponse,
};
use crate::source::{SnapshotSource, StoreCache};
use social_metrics::feed::{entity_feed, search_roster, EntityFeed};
use social_metrics::metrics::{
    engagement_pct, growth, platform_mix, series, trend_entities, LeaderboardRanker,
};
use social_metrics::{EngineConfig, MetricsError, Platform, SnapshotStore};

#[derive(Clone)]
struct AppState {
    config: Arc<EngineConfig>,
    cache: Arc<StoreCache>,
}

type ApiError = (StatusCode, String);

pub async fn serve(args: crate::ServeArgs, config: EngineConfig) -> Result<(), MetricsError> {
    let source = SnapshotSource::resolve(args.input, &config.source)?;
    if matches!(source, SnapshotSource::Stdin) {
        return Err(MetricsError::InvalidArgument(
            "the server cannot reload a snapshot log from stdin".to_string(),
        ));
    }

    let ttl = Duration::from_secs(config.source.cache_ttl_secs);
    let cache = StoreCache::new(source, config.platforms.clone(), ttl);
    let state = AppState {
        config: Arc::new(config),
        cache: Arc::new(cache),
    };

    let web_root = args.web_root;
    let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
    let static_service = ServeDir::new(web_root).not_found_service(ServeFile::new(index_path));

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/platforms", get(platforms_handler))
        .route("/api/students", get(roster_handler))
        .route("/api/students/:entity_id/feed", get(feed_handler))
        .route("/api/leaderboard", get(leaderboard_handler))
        .route("/api/series", get(series_handler))
        .route("/api/growth", get(growth_handler))
        .route("/api/engagement", get(engagement_handler))
        .route("/api/mix", get(mix_handler))
        .fallback_service(static_service)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| MetricsError::InvalidArgument(format!("invalid bind address: {}", err)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| MetricsError::io(format!("bind {}", addr), err))?;
    tracing::info!(%addr, "dashboard api listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| MetricsError::io("server", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn load_store(state: &AppState) -> Result<(Arc<SnapshotStore>, u64), ApiError> {
    state.cache.get().await.map_err(|err| {
        tracing::warn!(error = %err, "snapshot log unavailable");
        (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
    })
}

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, message)
}

async fn platforms_handler(State(state): State<AppState>) -> Json<Vec<Platform>> {
    Json(state.config.platforms.clone())
}

async fn roster_handler(
    State(state): State<AppState>,
    Query(query): Query<RosterQuery>,
) -> Result<Json<RosterResponse>, ApiError> {
    let (store, generation) = load_store(&state).await?;
    Ok(Json(RosterResponse {
        generation,
        as_of: store.current_date(),
        entries: search_roster(&store, query.search.as_deref().unwrap_or("")),
    }))
}

async fn feed_handler(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> Result<Json<EntityFeed>, ApiError> {
    let (store, _) = load_store(&state).await?;
    entity_feed(&store, &entity_id, &state.config)
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no current snapshot for {}", entity_id)))
}

async fn leaderboard_handler(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let platform = resolve_platform(&state.config.platforms, query.platform.as_deref()).map_err(bad_request)?;
    let metric = resolve_rank_metric(query.metric.as_deref()).map_err(bad_request)?;
    let (store, generation) = load_store(&state).await?;

    let Some(range) = resolve_range(&store, query.from, query.to) else {
        return Ok(Json(LeaderboardResponse::empty(platform, metric, generation)));
    };

    let ranker = LeaderboardRanker::new(state.config.leaderboard.clone());
    let top_n = query.top.unwrap_or(ranker.default_size());
    let leaderboard = ranker.rank(&store, &platform.code, metric, range, top_n);
    Ok(Json(LeaderboardResponse::from_leaderboard(leaderboard, platform, generation)))
}

async fn series_handler(
    State(state): State<AppState>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<SeriesResponse>, ApiError> {
    let platform = resolve_platform(&state.config.platforms, query.platform.as_deref()).map_err(bad_request)?;
    let metric = resolve_metric(query.metric.as_deref()).map_err(bad_request)?;
    let (store, generation) = load_store(&state).await?;

    let range = resolve_range(&store, query.from, query.to);
    let points = match range {
        Some(range) => {
            let requested: Vec<String> = query
                .entities
                .as_deref()
                .unwrap_or("")
                .split(',')
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect();
            let entity_ids = trend_entities(&store, &requested, &platform.code, range, &state.config);
            series(&store, &entity_ids, &platform.code, metric, range)
        }
        None => Vec::new(),
    };

    Ok(Json(SeriesResponse {
        generation,
        platform: platform.code.clone(),
        metric,
        range,
        points,
    }))
}

async fn growth_handler(
    State(state): State<AppState>,
    Query(query): Query<EntityMetricQuery>,
) -> Result<Json<MetricResponse>, ApiError> {
    let platform = resolve_platform(&state.config.platforms, query.platform.as_deref()).map_err(bad_request)?;
    let metric = resolve_metric(query.metric.as_deref()).map_err(bad_request)?;
    let (store, generation) = load_store(&state).await?;

    let as_of = query.as_of.or_else(|| store.current_date());
    let window = query.window.unwrap_or(state.config.growth.window_days);
    let value = as_of
        .map(|day| growth(&store, &query.entity, &platform.code, metric, day, window))
        .unwrap_or(0.0);

    Ok(Json(MetricResponse {
        generation,
        record: entity_record(&store, &query.entity, platform, "growth", value, as_of),
    }))
}

async fn engagement_handler(
    State(state): State<AppState>,
    Query(query): Query<EntityMetricQuery>,
) -> Result<Json<MetricResponse>, ApiError> {
    let platform = resolve_platform(&state.config.platforms, query.platform.as_deref()).map_err(bad_request)?;
    let (store, generation) = load_store(&state).await?;

    let as_of = query.as_of.or_else(|| store.current_date());
    let value = as_of
        .map(|day| engagement_pct(&store, &query.entity, &platform.code, day))
        .unwrap_or(0.0);

    Ok(Json(MetricResponse {
        generation,
        record: entity_record(&store, &query.entity, platform, "engagement", value, as_of),
    }))
}

async fn mix_handler(
    State(state): State<AppState>,
    Query(query): Query<MixQuery>,
) -> Result<Json<MixResponse>, ApiError> {
    let (store, generation) = load_store(&state).await?;
    let range = resolve_range(&store, query.from, query.to);
    let platforms = match range {
        Some(range) => platform_mix(&store, &state.config.platforms, range),
        None => Vec::new(),
    };
    Ok(Json(MixResponse {
        generation,
        range,
        platforms,
    }))
}
