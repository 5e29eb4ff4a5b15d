//! Visit metadata ingestion.
//!
//! - [`extract`]: visit identity from inline metadata, JSON form files or qc-status log names
//! - [`qc_log`]: the `<ptid>_<date>_<module>_qc-status.log` naming convention
//! - [`candidates`]: picking a visit's JSON form file
//! - [`submission`]: submission CSV rows

pub mod candidates;
pub mod error;
pub mod extract;
pub mod qc_log;
pub mod submission;

pub use candidates::select_visit_json;
pub use error::{IngestError, Result};
pub use extract::{VISIT_METADATA_KEY, VisitSources, extract};
pub use qc_log::{
    QC_LOG_SUFFIX, is_qc_log_filename, parse_qc_log_filename, qc_log_filename,
    qc_log_filename_for, qc_log_prefix,
};
pub use submission::{
    MISSING_VISIT_FIELD, SubmissionBatch, SubmissionRow, load_json_document, read_submission_csv,
    read_submission_file,
};
