//! Directory store behaviour through the QC helpers.

use serde_json::json;
use tempfile::TempDir;

use fqc_model::{QcStatus, ValidationModel};
use fqc_store::{
    DirectoryStore, DocumentKind, DocumentRef, LastFailedVisit, MetadataStore, last_failed_visit,
    read_qc_record, set_last_failed_visit, write_gear_validation,
};

#[test]
fn gear_updates_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = DirectoryStore::new(dir.path());
        store
            .set_document(
                &DocumentRef::file("a.json"),
                json!({"qc": {"checker": {"validation": {"state": "IN REVIEW", "data": []}}}}),
            )
            .unwrap();
        write_gear_validation(&store, "a.json", "coordinator", ValidationModel::passed())
            .unwrap();
    }

    let store = DirectoryStore::new(dir.path());
    let record = read_qc_record(&store, "a.json").unwrap();
    assert_eq!(record.gear_status("checker"), Some(QcStatus::InReview));
    assert_eq!(record.gear_status("coordinator"), Some(QcStatus::Pass));
    assert_eq!(record.get_file_status(), QcStatus::InReview);
}

#[test]
fn participant_metadata_lives_beside_files() {
    let dir = TempDir::new().unwrap();
    let store = DirectoryStore::new(dir.path());
    let failed = LastFailedVisit {
        file: "a.json".to_string(),
        visit_date: "2024-01-01".to_string(),
        visitnum: None,
    };
    set_last_failed_visit(&store, "P1", "UDS", Some(&failed)).unwrap();

    assert!(dir.path().join("participants/P1.json").is_file());
    assert_eq!(
        store.list_documents(DocumentKind::Participant).unwrap(),
        vec![DocumentRef::participant("P1")]
    );
    assert_eq!(last_failed_visit(&store, "P1", "UDS").unwrap(), Some(failed));
}
