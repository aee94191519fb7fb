//! Error types shared by the caption and segment pipeline.

use thiserror::Error;

/// Failures surfaced by the pure core.
/// Per-proposal problems never reach the caller through this type; the
/// segment mapper drops those entries and keeps going.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),

    #[error("no caption block could be parsed from the document")]
    UnparsableCaptionBlock,

    #[error("malformed oracle response: {0}")]
    MalformedOracleResponse(String),

    #[error("non-positive clip duration: {start} --> {end}")]
    NonPositiveDuration { start: String, end: String },

    #[error("source not found: {0}")]
    SourceNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
