// File: crates/chart-drawings/src/error.rs
// Summary: Error taxonomy for persistence and record decoding.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrawingError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("unknown drawing kind '{0}'")]
    UnknownKind(String),

    #[error("{kind} record is missing '{field}'")]
    MissingField { kind: &'static str, field: &'static str },

    #[error("storage unavailable: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, DrawingError>;
