use thiserror::Error;

/// Errors that reach the caller. Row-level problems in the CSV never show up
/// here; the loader absorbs them.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("data source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
