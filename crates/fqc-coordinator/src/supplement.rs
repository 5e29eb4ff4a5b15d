//! Supplement-visit resolution.
//!
//! A module with a supplement dependency may only be validated once the
//! participant has an approved visit of the supplement module with the same
//! visit date and visit number.

use std::collections::HashMap;

use fqc_model::{FileQcModel, QcStatus, VisitMetadata, normalize_module};
use fqc_store::{DocumentKind, MetadataStore};
use tracing::{debug, warn};

use crate::error::{CoordinatorError, Result};

/// What to look for when resolving a supplement visit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SupplementQuery {
    pub module: String,
    pub ptid: String,
    pub visit_date: String,
    pub visitnum: Option<String>,
}

impl SupplementQuery {
    pub fn new(
        module: &str,
        ptid: impl Into<String>,
        visit_date: impl Into<String>,
        visitnum: Option<String>,
    ) -> Self {
        Self {
            module: normalize_module(module),
            ptid: ptid.into(),
            visit_date: visit_date.into(),
            visitnum,
        }
    }

    fn matches(&self, visit: &VisitMetadata) -> bool {
        visit.ptid.as_deref() == Some(self.ptid.as_str())
            && visit.date.as_deref() == Some(self.visit_date.as_str())
            && visit.module.as_deref().map(normalize_module).as_deref()
                == Some(self.module.as_str())
            && visit.visitnum == self.visitnum
    }
}

/// Finds the approved supplement visit for a query.
pub trait SupplementResolver {
    /// The file holding the single approved match, `None` when there is no
    /// match, and `AmbiguousSupplement` when there is more than one.
    fn resolve(&self, query: &SupplementQuery) -> Result<Option<String>>;
}

/// Resolves supplements by scanning file documents in the metadata store.
///
/// A file matches when its `visit` metadata has the queried identity and its
/// overall QC status is PASS.
pub struct StoreSupplementResolver<'a> {
    store: &'a dyn MetadataStore,
}

impl<'a> StoreSupplementResolver<'a> {
    pub fn new(store: &'a dyn MetadataStore) -> Self {
        Self { store }
    }
}

impl SupplementResolver for StoreSupplementResolver<'_> {
    fn resolve(&self, query: &SupplementQuery) -> Result<Option<String>> {
        let mut matches = Vec::new();
        for doc in self.store.list_documents(DocumentKind::File)? {
            let document = self.store.get_document(&doc)?;
            let Some(visit) = document.get("visit") else {
                continue;
            };
            let visit: VisitMetadata = match serde_json::from_value(visit.clone()) {
                Ok(visit) => visit,
                Err(error) => {
                    debug!(document = %doc, %error, "skipping unreadable visit metadata");
                    continue;
                }
            };
            if !query.matches(&visit) {
                continue;
            }
            match FileQcModel::from_document(&document) {
                Ok(record) if is_approved(&record) => matches.push(doc.name().to_string()),
                Ok(_) => debug!(document = %doc, "supplement visit not approved"),
                Err(error) => warn!(document = %doc, %error, "ignoring malformed QC record"),
            }
        }

        if matches.len() > 1 {
            return Err(CoordinatorError::AmbiguousSupplement {
                supplement: query.module.clone(),
                ptid: query.ptid.clone(),
                visit_date: query.visit_date.clone(),
                visitnum: query.visitnum.clone(),
                matches,
            });
        }
        Ok(matches.pop())
    }
}

/// A record where no gear has finished has not been approved by anyone.
fn is_approved(record: &FileQcModel) -> bool {
    record.finished_file_status() == Some(QcStatus::Pass)
}

/// Per-run memo of supplement lookups.
///
/// Handed to the coordinator at construction so a batch over several
/// sequences resolves each supplement visit once, and so tests can start
/// from a known state.
#[derive(Debug, Default, Clone)]
pub struct VisitLookupCache {
    entries: HashMap<SupplementQuery, Option<String>>,
    hits: usize,
}

impl VisitLookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for the query, resolving and remembering it on a miss.
    /// Errors are not cached.
    pub fn get_or_resolve(
        &mut self,
        query: &SupplementQuery,
        resolver: &dyn SupplementResolver,
    ) -> Result<Option<String>> {
        if let Some(found) = self.entries.get(query) {
            self.hits += 1;
            return Ok(found.clone());
        }
        let found = resolver.resolve(query)?;
        self.entries.insert(query.clone(), found.clone());
        Ok(found)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fqc_store::{DocumentRef, InMemoryStore};
    use serde_json::json;

    fn supplement_doc(visitnum: &str, state: &str) -> serde_json::Value {
        json!({
            "visit": {"ptid": "P1", "visitdate": "2024-01-01", "module": "uds", "visitnum": visitnum},
            "qc": {"form-qc-checker": {"validation": {"state": state, "data": []}}}
        })
    }

    fn query() -> SupplementQuery {
        SupplementQuery::new("UDS", "P1", "2024-01-01", Some("1".to_string()))
    }

    #[test]
    fn resolves_single_approved_match() {
        let store = InMemoryStore::new();
        for (file, visitnum, state) in [
            ("uds-1.json", "1", "PASS"),
            ("uds-2.json", "2", "PASS"),
            ("uds-1b.json", "1", "FAIL"),
        ] {
            store
                .insert(DocumentRef::file(file), supplement_doc(visitnum, state))
                .unwrap();
        }

        let resolver = StoreSupplementResolver::new(&store);
        assert_eq!(
            resolver.resolve(&query()).unwrap().as_deref(),
            Some("uds-1.json")
        );
    }

    #[test]
    fn unfinished_supplement_is_not_approved() {
        let store = InMemoryStore::new();
        store
            .insert(
                DocumentRef::file("uds.json"),
                json!({
                    "visit": {"ptid": "P1", "date": "2024-01-01", "module": "UDS", "visitnum": "1"},
                    "qc": {"form-qc-checker": {"validation": {"state": null}}}
                }),
            )
            .unwrap();
        store
            .insert(
                DocumentRef::file("uds-empty.json"),
                json!({
                    "visit": {"ptid": "P1", "date": "2024-01-01", "module": "UDS", "visitnum": "1"},
                    "qc": {}
                }),
            )
            .unwrap();

        let resolver = StoreSupplementResolver::new(&store);
        assert_eq!(resolver.resolve(&query()).unwrap(), None);
    }

    #[test]
    fn two_approved_matches_are_ambiguous() {
        let store = InMemoryStore::new();
        for file in ["a.json", "b.json"] {
            store
                .insert(DocumentRef::file(file), supplement_doc("1", "PASS"))
                .unwrap();
        }

        let resolver = StoreSupplementResolver::new(&store);
        let err = resolver.resolve(&query()).unwrap_err();
        assert!(matches!(
            err,
            CoordinatorError::AmbiguousSupplement { ref matches, .. } if matches.len() == 2
        ));
    }

    #[test]
    fn cache_remembers_misses() {
        let store = InMemoryStore::new();
        let resolver = StoreSupplementResolver::new(&store);
        let mut cache = VisitLookupCache::new();
        assert_eq!(cache.get_or_resolve(&query(), &resolver).unwrap(), None);
        assert_eq!(cache.get_or_resolve(&query(), &resolver).unwrap(), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 1);
    }
}
