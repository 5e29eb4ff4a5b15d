//! In-process metadata store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::document::{DocumentKind, DocumentRef};
use crate::error::{Result, StoreError};
use crate::traits::MetadataStore;

/// A metadata store held in memory.
///
/// Every write is also appended to a write log so callers can check how often
/// a document was touched.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: Mutex<BTreeMap<DocumentRef, Value>>,
    writes: Mutex<Vec<DocumentRef>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document, bypassing the write log.
    pub fn insert(&self, doc: DocumentRef, document: Value) -> Result<()> {
        lock(&self.documents)?.insert(doc, document);
        Ok(())
    }

    /// Every write made through [`MetadataStore::set_document`], in order.
    pub fn writes(&self) -> Result<Vec<DocumentRef>> {
        Ok(lock(&self.writes)?.clone())
    }

    pub fn write_count(&self, doc: &DocumentRef) -> Result<usize> {
        Ok(lock(&self.writes)?.iter().filter(|w| *w == doc).count())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("metadata store lock poisoned".to_string()))
}

impl MetadataStore for InMemoryStore {
    fn get_document(&self, doc: &DocumentRef) -> Result<Value> {
        lock(&self.documents)?
            .get(doc)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { doc: doc.clone() })
    }

    fn set_document(&self, doc: &DocumentRef, document: Value) -> Result<()> {
        lock(&self.documents)?.insert(doc.clone(), document);
        lock(&self.writes)?.push(doc.clone());
        Ok(())
    }

    fn list_documents(&self, kind: DocumentKind) -> Result<Vec<DocumentRef>> {
        Ok(lock(&self.documents)?
            .keys()
            .filter(|doc| doc.kind() == kind)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_document_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.get_document(&DocumentRef::file("a.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn writes_are_logged() {
        let store = InMemoryStore::new();
        let doc = DocumentRef::file("a.json");
        store.insert(doc.clone(), json!({})).unwrap();
        store.set_document(&doc, json!({"x": 1})).unwrap();
        store.set_document(&doc, json!({"x": 2})).unwrap();
        assert_eq!(store.write_count(&doc).unwrap(), 2);
        assert_eq!(store.get_document(&doc).unwrap(), json!({"x": 2}));
    }

    #[test]
    fn lists_by_kind() {
        let store = InMemoryStore::new();
        store.insert(DocumentRef::file("b.json"), json!({})).unwrap();
        store.insert(DocumentRef::participant("P1"), json!({})).unwrap();
        store.insert(DocumentRef::file("a.json"), json!({})).unwrap();
        assert_eq!(
            store.list_documents(DocumentKind::File).unwrap(),
            vec![DocumentRef::file("a.json"), DocumentRef::file("b.json")]
        );
    }
}
