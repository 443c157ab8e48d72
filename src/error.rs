use thiserror::Error;

/// Failures at the edges of the engine: reading config and loading the
/// raw snapshot log. Metric computations themselves never fail.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("i/o error on {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("failed to parse snapshot log: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot source request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no snapshot source configured: pass --input or set SNAPSHOT_SOURCE_PATH / SNAPSHOT_SOURCE_URL")]
    NoSource,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl MetricsError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        MetricsError::Io {
            context: context.into(),
            source,
        }
    }
}
