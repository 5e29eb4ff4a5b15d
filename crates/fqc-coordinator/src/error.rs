//! Coordinator error types.
//!
//! Only conditions that abort a whole run are errors. A visit that fails
//! validation, times out or is blocked is reported as data in
//! [`crate::CoordinationReport`].

use fqc_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// More than one approved supplement visit matches a primary visit.
    #[error(
        "ambiguous {supplement} match for {ptid} on {visit_date} (visitnum {}): {}",
        .visitnum.as_deref().unwrap_or("-"),
        .matches.join(", ")
    )]
    AmbiguousSupplement {
        supplement: String,
        ptid: String,
        visit_date: String,
        visitnum: Option<String>,
        matches: Vec<String>,
    },

    /// The module has no registered configuration.
    #[error("no configuration for module {module}")]
    UnknownModule { module: String },

    /// A visit does not belong to the participant/module being coordinated.
    #[error("visit {file} belongs to {found}, expected {expected}")]
    MixedSequence {
        file: String,
        expected: String,
        found: String,
    },

    /// Reading or writing QC state failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure reported by a downstream validation trigger.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("failed to launch {gear}: {message}")]
    Launch { gear: String, message: String },

    #[error("failed to poll job {job}: {message}")]
    Poll { job: String, message: String },

    #[error("failed to cancel job {job}: {message}")]
    Cancel { job: String, message: String },
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;
