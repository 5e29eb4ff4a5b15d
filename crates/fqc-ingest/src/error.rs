//! Error types for visit metadata ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading submission artifacts.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON.
    #[error("failed to parse JSON {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse a submission CSV.
    #[error("failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Submission CSV lacks an identity column.
    #[error("required column '{column}' not found in submission header")]
    MissingColumn { column: String },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
