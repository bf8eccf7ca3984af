//! Error types for worklog.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
