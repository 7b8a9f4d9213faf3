use thiserror::Error;

/// Errors surfaced by the library. Per-port network failures never show up
/// here; a probe folds them into a closed port or an empty banner.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid port value: {0}")]
    InvalidPort(String),

    #[error("invalid port range {start}-{end} (start > end)")]
    InvalidRange { start: u16, end: u16 },

    #[error("timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),

    #[error("concurrency must be between 1 and {}", crate::config::MAX_CONCURRENCY)]
    InvalidConcurrency,

    #[error("cannot resolve hostname '{host}'")]
    Unresolvable {
        host: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
