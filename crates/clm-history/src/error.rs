//! History error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("An open position already exists in the history")]
    OpenPositionExists,
}

pub type HistoryResult<T> = Result<T, HistoryError>;
