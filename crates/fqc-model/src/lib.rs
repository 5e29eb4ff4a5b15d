//! Data model for form QC.
//!
//! - [`FileQcModel`]: the per-file QC status record, one entry per gear
//! - [`FileError`] and [`ClearedAlert`]: what gears report and what reviewers clear
//! - [`VisitKey`] and [`VisitMetadata`]: visit identity shared across artifacts
//! - [`visitor`]: traversal of QC records and the two standard report visitors

pub mod cleared;
pub mod de;
pub mod error;
pub mod file_error;
pub mod record;
pub mod status;
pub mod visit;
pub mod visitor;

pub use cleared::{AlertProvenance, ClearedAlert};
pub use error::{ModelError, Result};
pub use file_error::{CsvLocation, ErrorLocation, ErrorType, FileError, JsonLocation};
pub use record::{FileQcModel, GearQcModel, QC_KEY, ValidationModel};
pub use status::QcStatus;
pub use visit::{VisitKey, VisitMetadata, is_valid_for_event, normalize_module};
pub use visitor::{
    ErrorReportVisitor, GearContext, QcNode, QcVisitor, StatusReportVisitor, walk_cleared_alert,
    walk_file_model, walk_validation_model,
};
