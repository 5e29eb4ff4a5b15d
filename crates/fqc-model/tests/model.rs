//! Tests for QC records, visit identity and the report visitors.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use proptest::prelude::*;
use serde_json::json;

use fqc_model::{
    ErrorReportVisitor, ErrorType, FileError, FileQcModel, GearQcModel, QcNode, QcStatus,
    StatusReportVisitor, ValidationModel, VisitKey, VisitMetadata, is_valid_for_event,
};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn status_strategy() -> impl Strategy<Value = Option<QcStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(QcStatus::Pass)),
        Just(Some(QcStatus::InReview)),
        Just(Some(QcStatus::Fail)),
    ]
}

proptest! {
    #[test]
    fn file_status_is_strict_priority(states in proptest::collection::vec(status_strategy(), 0..8)) {
        let mut record = FileQcModel::default();
        for (idx, state) in states.iter().enumerate() {
            record.set_gear(
                format!("gear-{idx}"),
                GearQcModel::new(ValidationModel { state: *state, ..ValidationModel::default() }),
            );
        }
        let expected = if states.contains(&Some(QcStatus::Fail)) {
            QcStatus::Fail
        } else if states.contains(&Some(QcStatus::InReview)) {
            QcStatus::InReview
        } else {
            QcStatus::Pass
        };
        prop_assert_eq!(record.get_file_status(), expected);
    }

    #[test]
    fn visit_key_ignores_module_case(
        ptid in "[A-Za-z0-9]{1,10}",
        date in "[0-9]{4}-[0-9]{2}-[0-9]{2}",
        module in "[A-Za-z_]{1,8}",
    ) {
        let lower = VisitKey::new(ptid.clone(), date.clone(), module.to_lowercase());
        let upper = VisitKey::new(ptid, date, module.to_uppercase());
        prop_assert_eq!(hash_of(&lower), hash_of(&upper));
        prop_assert_eq!(lower, upper);
    }
}

#[test]
fn validity_predicate_examples() {
    let metadata = VisitMetadata::new("P1", "2024-01-01", "UDS");
    assert!(metadata.visitnum.is_none());
    assert!(is_valid_for_event(&metadata));

    let no_ptid = VisitMetadata {
        ptid: None,
        ..metadata
    };
    assert!(!is_valid_for_event(&no_ptid));
}

fn sample_record() -> FileQcModel {
    let document = json!({
        "qc": {
            "identifier-lookup": {"validation": {"state": "PASS", "data": []}},
            "form-qc-checker": {
                "validation": {
                    "state": "FAIL",
                    "data": [
                        {"type": "error", "code": "e1", "message": "bad birth year"},
                        {"type": "alert", "code": "a1", "message": "check weight"}
                    ]
                }
            },
            "form-transformer": {"validation": {"state": null, "data": []}},
            "legacy-gear": {
                "validation": {
                    "state": "pass",
                    "data": [{"type": "warning", "code": "w1", "message": "ignored"}]
                }
            }
        }
    });
    FileQcModel::from_document(&document).expect("parse record")
}

#[test]
fn status_report_skips_unfinished_gears() {
    let key = VisitKey::new("P1", "2024-01-01", "uds");
    let record = sample_record();
    let mut visitor = StatusReportVisitor::new(
        &key,
        |gear: &str, visit: &VisitKey, validation: &ValidationModel| {
            Ok(format!(
                "{gear}:{}:{}",
                visit.module(),
                validation.state.map(|s| s.label()).unwrap_or("-")
            ))
        },
    );
    record.apply(&mut visitor).unwrap();
    assert_eq!(
        visitor.into_rows(),
        vec![
            "form-qc-checker:UDS:FAIL".to_string(),
            "identifier-lookup:UDS:PASS".to_string(),
            "legacy-gear:UDS:PASS".to_string(),
        ]
    );
}

#[test]
fn error_report_visits_errors_of_non_passing_gears() {
    let key = VisitKey::new("P1", "2024-01-01", "UDS");
    let record = sample_record();
    let mut visitor =
        ErrorReportVisitor::new(&key, |gear: &str, _: &VisitKey, error: &FileError| {
            Ok((gear.to_string(), error.code().to_string()))
        });
    record.apply(&mut visitor).unwrap();
    assert_eq!(
        visitor.rows(),
        &[
            ("form-qc-checker".to_string(), "e1".to_string()),
            ("form-qc-checker".to_string(), "a1".to_string()),
        ]
    );
}

#[test]
fn error_report_includes_unfinished_gear_errors() {
    let key = VisitKey::new("P1", "2024-01-01", "UDS");
    let mut record = FileQcModel::default();
    record.set_gear(
        "checker",
        GearQcModel::new(ValidationModel {
            state: None,
            errors: vec![FileError::new(ErrorType::Error, "e1", "bad")],
            cleared_alerts: Vec::new(),
        }),
    );
    let mut visitor =
        ErrorReportVisitor::new(&key, |_: &str, _: &VisitKey, error: &FileError| {
            Ok(error.code().to_string())
        });
    record.apply(&mut visitor).unwrap();
    assert_eq!(visitor.into_rows(), vec!["e1".to_string()]);
}
