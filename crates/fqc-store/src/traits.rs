use serde_json::{Map, Value};

use crate::document::{DocumentKind, DocumentRef};
use crate::error::Result;

/// A document store holding one JSON object per file or participant.
///
/// Reads and writes are atomic per document only. There is no version check
/// on write: two writers updating the same document concurrently can lose an
/// update, so callers rely on the pipeline running one stage per file at a
/// time.
pub trait MetadataStore {
    /// Fetch a document; `StoreError::NotFound` when it does not exist.
    fn get_document(&self, doc: &DocumentRef) -> Result<Value>;

    /// Replace a document with the given value.
    fn set_document(&self, doc: &DocumentRef, document: Value) -> Result<()>;

    /// All documents of one kind, sorted.
    fn list_documents(&self, kind: DocumentKind) -> Result<Vec<DocumentRef>>;
}

/// Fetch a document, treating a missing one as an empty object.
pub fn get_or_empty(store: &dyn MetadataStore, doc: &DocumentRef) -> Result<Value> {
    match store.get_document(doc) {
        Ok(document) => Ok(document),
        Err(error) if error.is_not_found() => Ok(Value::Object(Map::new())),
        Err(error) => Err(error),
    }
}
