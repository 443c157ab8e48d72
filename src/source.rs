use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use social_metrics::config::SourceConfig;
use social_metrics::{MetricsError, Platform, RawRecord, SnapshotStore};

/// Where the raw snapshot log comes from.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    Stdin,
    File(PathBuf),
    Url(String),
}

impl SnapshotSource {
    /// `--input` wins over the configured path, which wins over the URL.
    pub fn resolve(input: Option<PathBuf>, config: &SourceConfig) -> Result<Self, MetricsError> {
        if let Some(path) = input {
            if path.as_os_str() == "-" {
                return Ok(SnapshotSource::Stdin);
            }
            return Ok(SnapshotSource::File(path));
        }
        if let Some(path) = config.path.clone() {
            return Ok(SnapshotSource::File(path));
        }
        if let Some(url) = config.url.clone() {
            return Ok(SnapshotSource::Url(url));
        }
        Err(MetricsError::NoSource)
    }

    pub fn describe(&self) -> String {
        match self {
            SnapshotSource::Stdin => "stdin".to_string(),
            SnapshotSource::File(path) => path.display().to_string(),
            SnapshotSource::Url(url) => url.clone(),
        }
    }

    pub async fn load(&self, client: &reqwest::Client) -> Result<Vec<RawRecord>, MetricsError> {
        let payload = match self {
            SnapshotSource::Stdin => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|err| MetricsError::io("stdin", err))?;
                buffer
            }
            SnapshotSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|err| MetricsError::io(format!("snapshot log {}", path.display()), err))?,
            SnapshotSource::Url(url) => client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?,
        };
        parse_records(&payload)
    }
}

/// Accepts a JSON array of row objects, or an object with a `records` array.
pub fn parse_records(payload: &str) -> Result<Vec<RawRecord>, MetricsError> {
    if payload.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(payload)?;
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut object) => match object.remove("records") {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(MetricsError::InvalidArgument(
                    "snapshot log object has no `records` array".to_string(),
                ))
            }
        },
        _ => {
            return Err(MetricsError::InvalidArgument(
                "snapshot log must be a JSON array of rows".to_string(),
            ))
        }
    };

    let total = rows.len();
    let records: Vec<RawRecord> = rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();
    if records.len() < total {
        tracing::warn!(ignored = total - records.len(), "non-object rows in snapshot log ignored");
    }
    Ok(records)
}

#[derive(Clone)]
struct CachedStore {
    store: Arc<SnapshotStore>,
    generation: u64,
    loaded_at: Instant,
}

/// Caches the ingested store for a time-to-live. Each caller receives an
/// immutable store plus the generation it was built in.
pub struct StoreCache {
    source: SnapshotSource,
    client: reqwest::Client,
    platforms: Vec<Platform>,
    ttl: Duration,
    state: Mutex<Option<CachedStore>>,
}

impl StoreCache {
    pub fn new(source: SnapshotSource, platforms: Vec<Platform>, ttl: Duration) -> Self {
        Self {
            source,
            client: reqwest::Client::new(),
            platforms,
            ttl,
            state: Mutex::new(None),
        }
    }

    /// Returns the cached store, reloading it once the TTL has passed. A
    /// failed reload keeps serving the previous generation when there is one.
    pub async fn get(&self) -> Result<(Arc<SnapshotStore>, u64), MetricsError> {
        let mut guard = self.state.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.loaded_at.elapsed() < self.ttl {
                return Ok((cached.store.clone(), cached.generation));
            }
        }

        let store = match self.reload().await {
            Ok(store) => store,
            Err(err) => match guard.as_ref() {
                Some(cached) => {
                    tracing::warn!(
                        source = %self.source.describe(),
                        generation = cached.generation,
                        error = %err,
                        "snapshot reload failed, serving cached store"
                    );
                    return Ok((cached.store.clone(), cached.generation));
                }
                None => return Err(err),
            },
        };

        let generation = guard.as_ref().map_or(1, |cached| cached.generation + 1);
        tracing::info!(
            source = %self.source.describe(),
            generation,
            snapshots = store.len(),
            "snapshot store reloaded"
        );

        *guard = Some(CachedStore {
            store: store.clone(),
            generation,
            loaded_at: Instant::now(),
        });
        Ok((store, generation))
    }

    async fn reload(&self) -> Result<Arc<SnapshotStore>, MetricsError> {
        let records = self.source.load(&self.client).await?;
        Ok(Arc::new(SnapshotStore::ingest(&records, &self.platforms)))
    }
}
