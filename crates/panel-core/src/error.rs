use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the usage panel.
#[derive(Error, Debug)]
pub enum PanelError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A timestamp string did not match any recognised format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// The backend refused or failed a request.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Convenience alias used throughout the panel crates.
pub type Result<T> = std::result::Result<T, PanelError>;
