//! Metadata store error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::document::DocumentRef;

/// Metadata store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document exists for the reference.
    #[error("document not found: {doc}")]
    NotFound { doc: DocumentRef },

    /// A stored document does not have the expected shape.
    #[error("malformed document {doc}: {reason}")]
    Malformed { doc: DocumentRef, reason: String },

    /// The reference cannot be mapped onto the backend.
    #[error("invalid document reference {doc}: {reason}")]
    InvalidRef { doc: DocumentRef, reason: String },

    /// File I/O error in a file-backed store.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic rename of a temp file onto its target failed.
    #[error("failed to replace {target_path} with {temp_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize a value into a document.
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Any other backend failure.
    #[error("metadata store failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn malformed(doc: &DocumentRef, reason: impl std::fmt::Display) -> Self {
        Self::Malformed {
            doc: doc.clone(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
