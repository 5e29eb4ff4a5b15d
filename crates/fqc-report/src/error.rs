//! Report error types.

use std::path::PathBuf;

use fqc_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// The store could not be listed. Per-file read failures are skipped, not raised.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to write report: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write report to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ReportError>;
