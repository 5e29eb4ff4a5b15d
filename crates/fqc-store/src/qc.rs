//! Read-modify-write helpers for per-file QC status records.
//!
//! A gear only ever replaces its own entry under `qc.<gear>`; every other key
//! of the file's document is written back untouched.

use fqc_model::{FileQcModel, GearQcModel, QC_KEY, QcStatus, ValidationModel};
use serde_json::{Map, Value};
use tracing::warn;

use crate::document::DocumentRef;
use crate::error::{Result, StoreError};
use crate::traits::{MetadataStore, get_or_empty};

/// Load the QC record of a file.
///
/// Fails with `NotFound` for an unknown file and `Malformed` when the stored
/// record does not match the schema.
pub fn read_qc_record(store: &dyn MetadataStore, file: &str) -> Result<FileQcModel> {
    let doc = DocumentRef::file(file);
    let document = store.get_document(&doc)?;
    FileQcModel::from_document(&document).map_err(|e| StoreError::malformed(&doc, e))
}

/// Load the QC record of a file, treating a missing or malformed record as
/// no prior record.
pub fn read_qc_record_lenient(store: &dyn MetadataStore, file: &str) -> Result<FileQcModel> {
    match read_qc_record(store, file) {
        Ok(record) => Ok(record),
        Err(StoreError::NotFound { .. }) => Ok(FileQcModel::default()),
        Err(StoreError::Malformed { doc, reason }) => {
            warn!(document = %doc, %reason, "ignoring malformed QC record");
            Ok(FileQcModel::default())
        }
        Err(error) => Err(error),
    }
}

/// The state one gear reported for a file, if it reported one.
pub fn read_gear_status(
    store: &dyn MetadataStore,
    file: &str,
    gear_name: &str,
) -> Result<Option<QcStatus>> {
    Ok(read_qc_record_lenient(store, file)?.gear_status(gear_name))
}

/// Replace one gear's validation outcome on a file, keeping all other gears.
pub fn write_gear_validation(
    store: &dyn MetadataStore,
    file: &str,
    gear_name: &str,
    validation: ValidationModel,
) -> Result<()> {
    let doc = DocumentRef::file(file);
    let mut document = get_or_empty(store, &doc)?;

    let root = document
        .as_object_mut()
        .ok_or_else(|| StoreError::malformed(&doc, "document is not an object"))?;
    let qc = root
        .entry(QC_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    if qc.is_null() {
        *qc = Value::Object(Map::new());
    }
    let gears = qc
        .as_object_mut()
        .ok_or_else(|| StoreError::malformed(&doc, "qc entry is not an object"))?;

    gears.insert(
        gear_name.to_string(),
        serde_json::to_value(GearQcModel::new(validation))?,
    );
    store.set_document(&doc, document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use fqc_model::{ErrorType, FileError};
    use serde_json::json;

    #[test]
    fn write_keeps_other_gears_and_keys() {
        let store = InMemoryStore::new();
        let doc = DocumentRef::file("f.json");
        store
            .insert(
                doc.clone(),
                json!({
                    "visit": {"ptid": "P1"},
                    "qc": {"form-qc-checker": {"validation": {"state": "PASS", "data": []}}}
                }),
            )
            .unwrap();

        write_gear_validation(
            &store,
            "f.json",
            "form-qc-coordinator",
            ValidationModel::failed(vec![FileError::new(ErrorType::Error, "e1", "bad")]),
        )
        .unwrap();

        let document = store.get_document(&doc).unwrap();
        assert_eq!(document["visit"]["ptid"], "P1");
        let record = read_qc_record(&store, "f.json").unwrap();
        assert_eq!(record.gear_status("form-qc-checker"), Some(QcStatus::Pass));
        assert_eq!(
            record.gear_status("form-qc-coordinator"),
            Some(QcStatus::Fail)
        );
    }

    #[test]
    fn write_creates_missing_document() {
        let store = InMemoryStore::new();
        write_gear_validation(&store, "new.json", "gear", ValidationModel::passed()).unwrap();
        assert_eq!(
            read_gear_status(&store, "new.json", "gear").unwrap(),
            Some(QcStatus::Pass)
        );
    }

    #[test]
    fn malformed_record_reads_as_empty() {
        let store = InMemoryStore::new();
        store
            .insert(
                DocumentRef::file("bad.json"),
                json!({"qc": {"gear": {"validation": {"state": 42}}}}),
            )
            .unwrap();
        assert!(matches!(
            read_qc_record(&store, "bad.json"),
            Err(StoreError::Malformed { .. })
        ));
        assert_eq!(read_gear_status(&store, "bad.json", "gear").unwrap(), None);
    }

    #[test]
    fn refuses_to_overwrite_non_object_qc() {
        let store = InMemoryStore::new();
        store
            .insert(DocumentRef::file("odd.json"), json!({"qc": "legacy"}))
            .unwrap();
        let err = write_gear_validation(&store, "odd.json", "gear", ValidationModel::passed())
            .unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }
}
