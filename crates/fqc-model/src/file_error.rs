//! Errors, warnings and alerts recorded against a file.
//!
//! [`FileError`] is serialized into the metadata store and into CSV error
//! reports, so its wire names (`type`, `code`, `location`, `value`,
//! `expected`, `message`, `ptid`, `visitnum`, `date`, `naccid`) are fixed.
//! Values are immutable once built; every occurrence gets its own error.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::visit::VisitMetadata;

/// Error code: the pipeline itself failed to process the visit.
pub const SYSTEM_ERROR: &str = "system-error";
/// Error code: no approved supplement-module visit matches this visit.
pub const SUPPLEMENT_NOT_APPROVED: &str = "supplement-not-approved";
/// Error code: an earlier visit of the same participant failed QC.
pub const VISIT_BLOCKED: &str = "visit-blocked";
/// Error code: a validation gear finished without recording a status.
pub const MISSING_QC_STATUS: &str = "missing-qc-status";

/// Kind of a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Alert,
    Error,
    Warning,
}

impl ErrorType {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// Position of a problem inside a CSV submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvLocation {
    pub line: u64,
    pub column_name: String,
}

/// Position of a problem inside a JSON form file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonLocation {
    pub key_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorLocation {
    Csv(CsvLocation),
    Json(JsonLocation),
}

impl ErrorLocation {
    pub fn csv(line: u64, column_name: impl Into<String>) -> Self {
        Self::Csv(CsvLocation {
            line,
            column_name: column_name.into(),
        })
    }

    pub fn json(key_path: impl Into<String>) -> Self {
        Self::Json(JsonLocation {
            key_path: key_path.into(),
        })
    }
}

impl std::fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(loc) => write!(f, "line {} column {}", loc.line, loc.column_name),
            Self::Json(loc) => f.write_str(&loc.key_path),
        }
    }
}

/// One reported problem with a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    #[serde(rename = "type")]
    error_type: ErrorType,
    #[serde(rename = "code")]
    error_code: String,
    #[serde(default)]
    location: Option<ErrorLocation>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    expected: Option<String>,
    message: String,
    #[serde(default)]
    ptid: Option<String>,
    #[serde(default)]
    visitnum: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    naccid: Option<String>,
}

impl FileError {
    pub fn new(error_type: ErrorType, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type,
            error_code: code.into(),
            location: None,
            value: None,
            expected: None,
            message: message.into(),
            ptid: None,
            visitnum: None,
            date: None,
            naccid: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: ErrorLocation) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Copy the participant and visit identifiers from visit metadata.
    #[must_use]
    pub fn with_visit(mut self, visit: &VisitMetadata) -> Self {
        self.ptid.clone_from(&visit.ptid);
        self.visitnum.clone_from(&visit.visitnum);
        self.date.clone_from(&visit.date);
        self.naccid.clone_from(&visit.naccid);
        self
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn code(&self) -> &str {
        &self.error_code
    }

    pub fn location(&self) -> Option<&ErrorLocation> {
        self.location.as_ref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn ptid(&self) -> Option<&str> {
        self.ptid.as_deref()
    }

    pub fn visitnum(&self) -> Option<&str> {
        self.visitnum.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn naccid(&self) -> Option<&str> {
        self.naccid.as_deref()
    }

    pub fn is_alert(&self) -> bool {
        self.error_type == ErrorType::Alert
    }

    /// Lowercase hex SHA-256 of the error's wire JSON.
    ///
    /// Cleared-alert records refer to alerts by this hash.
    pub fn alert_hash(&self) -> String {
        // Serializing a struct of strings and options cannot fail.
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&canonical))
    }

    /// Generic pipeline failure for a visit.
    pub fn system_error(message: impl Into<String>, visit: &VisitMetadata) -> Self {
        Self::new(ErrorType::Error, SYSTEM_ERROR, message).with_visit(visit)
    }

    /// The visit's supplement-module counterpart is missing or not approved.
    pub fn supplement_not_approved(supplement_module: &str, visit: &VisitMetadata) -> Self {
        let module = visit.module.as_deref().unwrap_or_default();
        Self::new(
            ErrorType::Error,
            SUPPLEMENT_NOT_APPROVED,
            format!(
                "{module} visit requires an approved {supplement_module} visit with the same visit date and visit number"
            ),
        )
        .with_visit(visit)
    }

    /// The visit was not evaluated because an earlier visit failed.
    pub fn visit_blocked(failed_file: &str, visit: &VisitMetadata) -> Self {
        Self::new(
            ErrorType::Error,
            VISIT_BLOCKED,
            format!("Visit not validated: a previous visit failed QC ({failed_file})"),
        )
        .with_value(failed_file)
        .with_visit(visit)
    }

    /// A validation gear finished but left no status for the file.
    pub fn missing_qc_status(gear_name: &str, visit: &VisitMetadata) -> Self {
        Self::new(
            ErrorType::Error,
            MISSING_QC_STATUS,
            format!("Gear {gear_name} completed without recording a QC status"),
        )
        .with_visit(visit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_wire_names() {
        let visit = VisitMetadata::new("P1", "2024-01-01", "UDS").with_visitnum("1");
        let error = FileError::new(ErrorType::Error, "range", "value out of range")
            .with_location(ErrorLocation::csv(3, "birthyr"))
            .with_value("1800")
            .with_expected("1900-2024")
            .with_visit(&visit);

        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "error",
                "code": "range",
                "location": {"line": 3, "column_name": "birthyr"},
                "value": "1800",
                "expected": "1900-2024",
                "message": "value out of range",
                "ptid": "P1",
                "visitnum": "1",
                "date": "2024-01-01",
                "naccid": null
            })
        );
    }

    #[test]
    fn reads_json_location() {
        let error: FileError = serde_json::from_value(json!({
            "type": "alert",
            "code": "a1",
            "location": {"key_path": "forms.uds.a1"},
            "message": "check"
        }))
        .unwrap();
        assert!(error.is_alert());
        assert_eq!(error.location(), Some(&ErrorLocation::json("forms.uds.a1")));
        assert_eq!(error.ptid(), None);
    }

    #[test]
    fn alert_hash_tracks_content() {
        let a = FileError::new(ErrorType::Alert, "a1", "check value");
        let b = FileError::new(ErrorType::Alert, "a1", "check value");
        let c = FileError::new(ErrorType::Alert, "a1", "check other value");
        assert_eq!(a.alert_hash(), b.alert_hash());
        assert_ne!(a.alert_hash(), c.alert_hash());
        assert_eq!(a.alert_hash().len(), 64);
    }

    #[test]
    fn blocked_error_names_failed_file() {
        let visit = VisitMetadata::new("P1", "2024-03-01", "UDS");
        let error = FileError::visit_blocked("P1_2024-02-01_uds.json", &visit);
        assert_eq!(error.code(), VISIT_BLOCKED);
        assert_eq!(error.value(), Some("P1_2024-02-01_uds.json"));
        assert!(error.message().contains("P1_2024-02-01_uds.json"));
        assert_eq!(error.date(), Some("2024-03-01"));
    }
}
