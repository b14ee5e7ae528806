//! Error types shared across the timer board

use thiserror::Error;

/// Rejected input for a new timer. The collection is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("timer name must not be empty")]
    EmptyName,

    #[error("timer category must not be empty")]
    EmptyCategory,

    #[error("duration must be a positive number of seconds, got {0}")]
    NonPositiveDuration(i64),

    #[error("duration must be a whole number of seconds, got {0:?}")]
    InvalidDuration(String),
}

/// Failure talking to the durable key-value store.
///
/// Never fatal: the in-memory store stays authoritative and the next save
/// carries the full current state.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read key {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write key {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored data under key {key} is not valid: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode data for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Failure handing exported history to the share sink.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("failed to render history: {0}")]
    Render(#[from] serde_json::Error),

    #[error("export sink rejected the export: {0}")]
    Sink(String),
}
