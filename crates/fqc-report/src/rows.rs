//! Report row shapes.

use fqc_model::{FileError, ValidationModel, VisitKey};
use serde::Serialize;

/// A row type with a fixed CSV header.
pub trait ReportRow: Serialize {
    const HEADERS: &'static [&'static str];
}

/// One finished gear of one visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReportRow {
    pub ptid: String,
    pub date: String,
    pub module: String,
    pub gear: String,
    pub status: String,
}

impl StatusReportRow {
    pub fn new(gear_name: &str, visit: &VisitKey, validation: &ValidationModel) -> Self {
        Self {
            ptid: visit.ptid().to_string(),
            date: visit.date().to_string(),
            module: visit.module().to_string(),
            gear: gear_name.to_string(),
            status: validation
                .state
                .map(|state| state.label().to_string())
                .unwrap_or_default(),
        }
    }
}

impl ReportRow for StatusReportRow {
    const HEADERS: &'static [&'static str] = &["ptid", "date", "module", "gear", "status"];
}

/// One error reported by a gear that did not pass.
///
/// Columns follow the stored error's field names, then the gear and module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReportRow {
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: String,
    pub location: Option<String>,
    pub value: Option<String>,
    pub expected: Option<String>,
    pub message: String,
    pub ptid: String,
    pub visitnum: Option<String>,
    pub date: String,
    pub naccid: Option<String>,
    pub gear_name: String,
    pub module: String,
}

impl ErrorReportRow {
    /// Error fields win; the visit fills in identity the error does not carry.
    pub fn new(gear_name: &str, visit: &VisitKey, error: &FileError) -> Self {
        Self {
            error_type: error.error_type().label().to_string(),
            code: error.code().to_string(),
            location: error.location().map(ToString::to_string),
            value: error.value().map(str::to_string),
            expected: error.expected().map(str::to_string),
            message: error.message().to_string(),
            ptid: error.ptid().unwrap_or(visit.ptid()).to_string(),
            visitnum: error.visitnum().map(str::to_string),
            date: error.date().unwrap_or(visit.date()).to_string(),
            naccid: error.naccid().map(str::to_string),
            gear_name: gear_name.to_string(),
            module: visit.module().to_string(),
        }
    }
}

impl ReportRow for ErrorReportRow {
    const HEADERS: &'static [&'static str] = &[
        "type",
        "code",
        "location",
        "value",
        "expected",
        "message",
        "ptid",
        "visitnum",
        "date",
        "naccid",
        "gear_name",
        "module",
    ];
}
