//! Error types for the form QC data model.

use thiserror::Error;

/// Errors raised while reading QC records or walking them with a visitor.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The persisted QC record does not match the expected shape.
    #[error("malformed QC record: {0}")]
    Schema(#[from] serde_json::Error),

    /// A QC status string that is none of PASS, FAIL or IN REVIEW.
    #[error("unrecognized QC status '{0}'")]
    UnknownStatus(String),

    /// A visitor reached a node that needs the active gear name outside of a gear.
    #[error("no active gear while visiting {node}")]
    MissingGearContext { node: &'static str },

    /// A caller-supplied report transform rejected a node.
    #[error("report transform failed for gear '{gear}': {message}")]
    Transform { gear: String, message: String },
}

impl ModelError {
    /// Build a transform failure for the given gear.
    pub fn transform(gear: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Transform {
            gear: gear.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
