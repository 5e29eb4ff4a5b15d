//! Report scans over a small project.

use serde_json::json;
use tempfile::TempDir;

use fqc_report::{ScanSummary, error_report, status_report, write_csv, write_csv_file};
use fqc_store::{DocumentRef, InMemoryStore};

fn project() -> InMemoryStore {
    let store = InMemoryStore::new();
    let docs = [
        (
            "P1_2024-01-01_uds_qc-status.log",
            json!({
                "qc": {
                    "form-qc-checker": {"validation": {"state": "FAIL", "data": [
                        {
                            "type": "error",
                            "code": "e1",
                            "location": {"line": 2, "column_name": "birthyr"},
                            "value": "1800",
                            "expected": "1900-2024",
                            "message": "birth year out of range"
                        },
                        {"type": "alert", "code": "a1", "message": "weight changed by more than 10%"}
                    ]}},
                    "form-qc-coordinator": {"validation": {"state": "FAIL", "data": []}},
                    "form-transformer": {"validation": {"state": "PASS", "data": []}}
                }
            }),
        ),
        (
            "broken.log",
            json!({"qc": {"form-qc-checker": {"validation": {"state": "PASS"}}}}),
        ),
        ("form.json", json!({"ptid": "P1"})),
        (
            "malformed.log",
            json!({
                "visit": {"ptid": "P3", "date": "2024-03-01", "module": "UDS"},
                "qc": {"form-qc-checker": {"validation": {"state": "MAYBE"}}}
            }),
        ),
        (
            "p2-upload.json",
            json!({
                "visit": {"ptid": "P2", "visitdate": "2024-02-01", "module": "uds"},
                "qc": {
                    "form-qc-checker": {"validation": {"state": "PASS", "data": []}},
                    "form-transformer": {"validation": {"state": null, "data": []}}
                }
            }),
        ),
    ];
    for (name, document) in docs {
        store.insert(DocumentRef::file(name), document).unwrap();
    }
    store
}

#[test]
fn status_report_skips_bad_files() {
    let store = project();
    let outcome = status_report(&store).unwrap();
    assert_eq!(
        outcome.summary,
        ScanSummary {
            scanned: 4,
            reported: 2,
            skipped: 2,
            rows: 4,
        }
    );

    let mut out = Vec::new();
    write_csv(&mut out, &outcome.rows).unwrap();
    insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
    ptid,date,module,gear,status
    P1,2024-01-01,UDS,form-qc-checker,FAIL
    P1,2024-01-01,UDS,form-qc-coordinator,FAIL
    P1,2024-01-01,UDS,form-transformer,PASS
    P2,2024-02-01,UDS,form-qc-checker,PASS
    ");
}

#[test]
fn error_report_lists_errors_of_failing_gears() {
    let store = project();
    let outcome = error_report(&store).unwrap();
    assert_eq!(outcome.summary.rows, 2);
    assert_eq!(outcome.summary.reported, 1);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("errors.csv");
    write_csv_file(&path, &outcome.rows).unwrap();
    insta::assert_snapshot!(std::fs::read_to_string(&path).unwrap(), @r"
    type,code,location,value,expected,message,ptid,visitnum,date,naccid,gear_name,module
    error,e1,line 2 column birthyr,1800,1900-2024,birth year out of range,P1,,2024-01-01,,form-qc-checker,UDS
    alert,a1,,,,weight changed by more than 10%,P1,,2024-01-01,,form-qc-checker,UDS
    ");
}
