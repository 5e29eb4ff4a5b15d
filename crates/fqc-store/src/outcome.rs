//! Outcome events already emitted for a visit.
//!
//! The event stage stamps each qc-status log document it finalizes with the
//! file status the outcome event carried:
//!
//! ```text
//! { "outcome_event": { "status": "PASS" } }
//! ```
//!
//! A later run skips logs whose status still matches the stamp, so each QC
//! outcome produces one outcome event however often the stage runs.

use fqc_model::QcStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::document::DocumentRef;
use crate::error::{Result, StoreError};
use crate::traits::{MetadataStore, get_or_empty};

/// Document key owned by the event stage.
pub const OUTCOME_EVENT_KEY: &str = "outcome_event";

#[derive(Debug, Serialize, Deserialize)]
struct OutcomeStamp {
    status: QcStatus,
}

/// Status of the last outcome event emitted for a loaded document.
///
/// A missing or unreadable stamp reads as "never emitted".
pub fn emitted_outcome(document: &Value) -> Option<QcStatus> {
    let stamp = document.get(OUTCOME_EVENT_KEY)?;
    match serde_json::from_value::<OutcomeStamp>(stamp.clone()) {
        Ok(stamp) => Some(stamp.status),
        Err(error) => {
            debug!(%error, "ignoring unreadable outcome stamp");
            None
        }
    }
}

/// Record that an outcome event with `status` was emitted for a file.
///
/// Only the stamp key is replaced; every other key is kept.
pub fn set_emitted_outcome(store: &dyn MetadataStore, file: &str, status: QcStatus) -> Result<()> {
    let doc = DocumentRef::file(file);
    let mut document = get_or_empty(store, &doc)?;
    let root = document
        .as_object_mut()
        .ok_or_else(|| StoreError::malformed(&doc, "document is not an object"))?;
    root.insert(
        OUTCOME_EVENT_KEY.to_string(),
        serde_json::to_value(OutcomeStamp { status })?,
    );
    store.set_document(&doc, document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use serde_json::json;

    #[test]
    fn stamp_keeps_other_keys() {
        let store = InMemoryStore::new();
        let doc = DocumentRef::file("log");
        store
            .insert(doc.clone(), json!({"qc": {"gear": {"validation": {"state": "PASS"}}}}))
            .unwrap();

        assert_eq!(emitted_outcome(&store.get_document(&doc).unwrap()), None);
        set_emitted_outcome(&store, "log", QcStatus::InReview).unwrap();

        let document = store.get_document(&doc).unwrap();
        assert_eq!(emitted_outcome(&document), Some(QcStatus::InReview));
        assert_eq!(document["qc"]["gear"]["validation"]["state"], "PASS");
        assert_eq!(document[OUTCOME_EVENT_KEY], json!({"status": "IN REVIEW"}));
    }

    #[test]
    fn unreadable_stamp_reads_as_never_emitted() {
        assert_eq!(emitted_outcome(&json!({OUTCOME_EVENT_KEY: "PASS"})), None);
        assert_eq!(emitted_outcome(&json!({OUTCOME_EVENT_KEY: {"status": "MAYBE"}})), None);
    }
}
