//! Event sink error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write event to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The sink refused the event.
    #[error("event rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, SinkError>;
