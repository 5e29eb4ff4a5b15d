//! Participant-level side metadata.
//!
//! The coordinator remembers, per module, the visit where the last run
//! stopped so a re-submission knows where to resume:
//!
//! ```text
//! { "visits": { "<MODULE>": { "last_failed_visit": { "file": ..., "visit_date": ..., "visitnum": ... } } } }
//! ```

use fqc_model::normalize_module;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::DocumentRef;
use crate::error::{Result, StoreError};
use crate::traits::{MetadataStore, get_or_empty};

const VISITS_KEY: &str = "visits";
const LAST_FAILED_KEY: &str = "last_failed_visit";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastFailedVisit {
    pub file: String,
    pub visit_date: String,
    #[serde(default)]
    pub visitnum: Option<String>,
}

/// The last failed visit recorded for a participant and module.
pub fn last_failed_visit(
    store: &dyn MetadataStore,
    ptid: &str,
    module: &str,
) -> Result<Option<LastFailedVisit>> {
    let doc = DocumentRef::participant(ptid);
    let document = get_or_empty(store, &doc)?;
    let Some(entry) = document
        .get(VISITS_KEY)
        .and_then(|visits| visits.get(normalize_module(module)))
        .and_then(|module| module.get(LAST_FAILED_KEY))
    else {
        return Ok(None);
    };
    if entry.is_null() {
        return Ok(None);
    }
    serde_json::from_value(entry.clone())
        .map(Some)
        .map_err(|e| StoreError::malformed(&doc, e))
}

/// Record or clear (`None`) the last failed visit for a participant and module.
pub fn set_last_failed_visit(
    store: &dyn MetadataStore,
    ptid: &str,
    module: &str,
    visit: Option<&LastFailedVisit>,
) -> Result<()> {
    let doc = DocumentRef::participant(ptid);
    let mut document = get_or_empty(store, &doc)?;

    let root = document
        .as_object_mut()
        .ok_or_else(|| StoreError::malformed(&doc, "document is not an object"))?;
    let visits = root
        .entry(VISITS_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| StoreError::malformed(&doc, "visits entry is not an object"))?;
    let module_entry = visits
        .entry(normalize_module(module))
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| StoreError::malformed(&doc, "module entry is not an object"))?;

    match visit {
        Some(visit) => {
            module_entry.insert(LAST_FAILED_KEY.to_string(), serde_json::to_value(visit)?);
        }
        None => {
            module_entry.remove(LAST_FAILED_KEY);
        }
    }
    store.set_document(&doc, document)
}
