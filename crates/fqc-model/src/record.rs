//! Per-file QC status record.
//!
//! A file's metadata document carries a `qc` object mapping each gear name
//! to that gear's validation outcome:
//!
//! ```text
//! { "qc": { "<gear>": { "validation": { "state": "PASS", "data": [...], "cleared": [...] } } } }
//! ```
//!
//! Each gear owns exactly one entry. Writers must replace only their own entry
//! and keep the others (see `fqc-store` for the read-modify-write helpers).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cleared::ClearedAlert;
use crate::error::Result;
use crate::file_error::FileError;
use crate::status::QcStatus;

/// Document key holding the QC record.
pub const QC_KEY: &str = "qc";

/// One gear's validation outcome for a file.
///
/// `state` is `None` while the gear has not finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationModel {
    #[serde(default)]
    pub state: Option<QcStatus>,
    #[serde(default, rename = "data", alias = "errors")]
    pub errors: Vec<FileError>,
    #[serde(default, rename = "cleared", alias = "clearedAlerts")]
    pub cleared_alerts: Vec<ClearedAlert>,
}

impl ValidationModel {
    pub fn new(state: QcStatus, errors: Vec<FileError>) -> Self {
        Self {
            state: Some(state),
            errors,
            cleared_alerts: Vec::new(),
        }
    }

    pub fn passed() -> Self {
        Self::new(QcStatus::Pass, Vec::new())
    }

    pub fn failed(errors: Vec<FileError>) -> Self {
        Self::new(QcStatus::Fail, errors)
    }

    /// Whether a reviewer has cleared the given alert.
    pub fn is_alert_cleared(&self, alert: &FileError) -> bool {
        let hash = alert.alert_hash();
        self.cleared_alerts.iter().any(|cleared| cleared.clears(&hash))
    }

    /// Alerts that still need review.
    pub fn uncleared_alerts(&self) -> Vec<&FileError> {
        self.errors
            .iter()
            .filter(|error| error.is_alert() && !self.is_alert_cleared(error))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearQcModel {
    #[serde(default)]
    pub validation: ValidationModel,
}

impl GearQcModel {
    pub fn new(validation: ValidationModel) -> Self {
        Self { validation }
    }

    pub fn state(&self) -> Option<QcStatus> {
        self.validation.state
    }
}

/// QC record of one file, keyed by gear name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileQcModel {
    #[serde(default)]
    pub qc: BTreeMap<String, GearQcModel>,
}

impl FileQcModel {
    /// Parse the QC record out of a file's metadata document.
    ///
    /// A document without a `qc` key yields an empty record.
    pub fn from_document(document: &Value) -> Result<Self> {
        match document.get(QC_KEY) {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(qc) => Ok(Self {
                qc: serde_json::from_value(qc.clone())?,
            }),
        }
    }

    pub fn gear(&self, gear_name: &str) -> Option<&GearQcModel> {
        self.qc.get(gear_name)
    }

    pub fn gear_status(&self, gear_name: &str) -> Option<QcStatus> {
        self.gear(gear_name).and_then(GearQcModel::state)
    }

    /// Replace one gear's entry, keeping every other gear's entry.
    pub fn set_gear(&mut self, gear_name: impl Into<String>, model: GearQcModel) {
        self.qc.insert(gear_name.into(), model);
    }

    pub fn gears(&self) -> impl Iterator<Item = (&str, &GearQcModel)> {
        self.qc.iter().map(|(name, gear)| (name.as_str(), gear))
    }

    /// Overall file status: FAIL if any gear failed, else IN REVIEW if any gear
    /// is in review, else PASS. Gears that have not finished do not count.
    pub fn get_file_status(&self) -> QcStatus {
        QcStatus::aggregate(self.qc.values().filter_map(GearQcModel::state))
    }

    /// Whether at least one gear has reported a status.
    pub fn has_finished_gear(&self) -> bool {
        self.qc.values().any(|gear| gear.state().is_some())
    }

    /// File status once some gear has finished, `None` while none has.
    ///
    /// Use this instead of [`Self::get_file_status`] wherever an unfinished
    /// record must not read as PASS.
    pub fn finished_file_status(&self) -> Option<QcStatus> {
        self.has_finished_gear().then(|| self.get_file_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleared::AlertProvenance;
    use crate::file_error::ErrorType;
    use serde_json::json;

    fn record(states: &[(&str, Option<QcStatus>)]) -> FileQcModel {
        let mut model = FileQcModel::default();
        for (gear, state) in states {
            model.set_gear(
                *gear,
                GearQcModel::new(ValidationModel {
                    state: *state,
                    ..ValidationModel::default()
                }),
            );
        }
        model
    }

    #[test]
    fn file_status_priority() {
        assert_eq!(
            record(&[("a", Some(QcStatus::Pass)), ("b", Some(QcStatus::InReview))])
                .get_file_status(),
            QcStatus::InReview
        );
        assert_eq!(
            record(&[("a", Some(QcStatus::Fail)), ("b", Some(QcStatus::Pass))]).get_file_status(),
            QcStatus::Fail
        );
        assert_eq!(
            record(&[("a", None), ("b", Some(QcStatus::Pass))]).get_file_status(),
            QcStatus::Pass
        );
        assert_eq!(FileQcModel::default().get_file_status(), QcStatus::Pass);
    }

    #[test]
    fn unfinished_record_has_no_finished_status() {
        let running = record(&[("a", None), ("b", None)]);
        assert!(!running.has_finished_gear());
        assert_eq!(running.finished_file_status(), None);
        assert_eq!(FileQcModel::default().finished_file_status(), None);
        assert_eq!(
            record(&[("a", None), ("b", Some(QcStatus::Pass))]).finished_file_status(),
            Some(QcStatus::Pass)
        );
    }

    #[test]
    fn parses_stored_document() {
        let document = json!({
            "visit": {"ptid": "P1"},
            "qc": {
                "form-qc-checker": {
                    "validation": {
                        "state": "IN REVIEW",
                        "data": [{"type": "alert", "code": "a1", "message": "check"}],
                        "cleared": []
                    }
                },
                "form-transformer": {"validation": {"state": "PASS", "data": []}}
            }
        });
        let model = FileQcModel::from_document(&document).unwrap();
        assert_eq!(model.qc.len(), 2);
        assert_eq!(
            model.gear_status("form-qc-checker"),
            Some(QcStatus::InReview)
        );
        assert_eq!(model.gear_status("missing"), None);
    }

    #[test]
    fn missing_qc_key_is_empty_record() {
        let model = FileQcModel::from_document(&json!({"other": 1})).unwrap();
        assert!(model.qc.is_empty());
    }

    #[test]
    fn malformed_record_is_an_error() {
        let document = json!({"qc": {"gear": {"validation": {"state": "MAYBE"}}}});
        assert!(FileQcModel::from_document(&document).is_err());
    }

    #[test]
    fn accepts_long_field_aliases() {
        let validation: ValidationModel = serde_json::from_value(json!({
            "state": "FAIL",
            "errors": [{"type": "error", "code": "e1", "message": "bad"}],
            "clearedAlerts": []
        }))
        .unwrap();
        assert_eq!(validation.errors.len(), 1);
    }

    #[test]
    fn cleared_alerts_are_filtered() {
        let alert = FileError::new(ErrorType::Alert, "a1", "check");
        let other = FileError::new(ErrorType::Alert, "a2", "check again");
        let error = FileError::new(ErrorType::Error, "e1", "bad");
        let validation = ValidationModel {
            state: Some(QcStatus::InReview),
            errors: vec![alert.clone(), other.clone(), error],
            cleared_alerts: vec![ClearedAlert {
                clear: true,
                finalized: false,
                provenance: vec![AlertProvenance {
                    user: "reviewer".to_string(),
                    clear_set_to: true,
                    timestamp: "2024-05-01T10:00:00Z".to_string(),
                }],
                alert_hash: alert.alert_hash(),
            }],
        };
        assert!(validation.is_alert_cleared(&alert));
        assert_eq!(validation.uncleared_alerts(), vec![&other]);
    }
}
