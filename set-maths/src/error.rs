//! Error type shared by the registry, combinator, exporter, seeding and
//! Lucas-Lehmer checkpoints.

use std::path::PathBuf;

/// Errors that can occur while selecting, combining or exporting sets.
#[derive(Debug, thiserror::Error)]
pub enum SetError {
    #[error("unknown set name '{0}'")]
    UnknownSetName(String),

    #[error("set name '{0}' is already registered")]
    DuplicateSetName(String),

    #[error("set index counter exhausted at '{0}'")]
    SetIndexExhausted(String),

    #[error("limit {limit} exceeds the {available} pairs available")]
    LimitExceedsSet { limit: usize, available: usize },

    #[error("failed to write export to {path}: {source}")]
    ExportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed value: {0}")]
    InvalidValue(#[from] set_core::ParseError),

    #[error("failed to load seed file {path}: {reason}")]
    SeedFile { path: PathBuf, reason: String },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("checkpoint {path}: {reason}")]
    Checkpoint { path: PathBuf, reason: String },

    #[error("invalid value '{value}' for {flag}")]
    InvalidArgument { flag: String, value: String },
}
