//! QC status and error reports over a whole project.

pub mod error;
pub mod output;
pub mod rows;
pub mod scan;

pub use error::{ReportError, Result};
pub use output::{write_csv, write_csv_file};
pub use rows::{ErrorReportRow, ReportRow, StatusReportRow};
pub use scan::{ScanOutcome, ScanSummary, error_report, scan, status_report};
