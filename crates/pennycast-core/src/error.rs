//! Error types for Pennycast

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Insufficient data: need at least 2 distinct months to train, got {0}")]
    InsufficientData(usize),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to replace file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Expenses file {path} could not be read ({reason}); fix it or import a replacement")]
    UnreadableStore { path: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
