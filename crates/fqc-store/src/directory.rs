//! File-backed metadata store.
//!
//! Layout under the root directory:
//!
//! ```text
//! files/<file name>.json
//! participants/<ptid>.json
//! ```
//!
//! Writes go to a temp file that is then renamed over the target, so a
//! reader never sees a half-written document.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::document::{DocumentKind, DocumentRef};
use crate::error::{Result, StoreError};
use crate::traits::MetadataStore;

const DOCUMENT_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn kind_dir(&self, kind: DocumentKind) -> PathBuf {
        match kind {
            DocumentKind::File => self.root.join("files"),
            DocumentKind::Participant => self.root.join("participants"),
        }
    }

    fn document_path(&self, doc: &DocumentRef) -> Result<PathBuf> {
        let name = doc.name();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(StoreError::InvalidRef {
                doc: doc.clone(),
                reason: "name must be a single path component".to_string(),
            });
        }
        Ok(self
            .kind_dir(doc.kind())
            .join(format!("{name}.{DOCUMENT_EXTENSION}")))
    }
}

impl MetadataStore for DirectoryStore {
    fn get_document(&self, doc: &DocumentRef) -> Result<Value> {
        let path = self.document_path(doc)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound { doc: doc.clone() });
            }
            Err(e) => {
                return Err(StoreError::Io {
                    operation: "read",
                    path,
                    source: e,
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::malformed(doc, e))
    }

    fn set_document(&self, doc: &DocumentRef, document: Value) -> Result<()> {
        let path = self.document_path(doc)?;
        let bytes = serde_json::to_vec_pretty(&document)?;
        write_atomic(&path, &bytes)?;
        tracing::debug!(document = %doc, path = %path.display(), "wrote metadata document");
        Ok(())
    }

    fn list_documents(&self, kind: DocumentKind) -> Result<Vec<DocumentRef>> {
        let dir = self.kind_dir(kind);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    operation: "list",
                    path: dir,
                    source: e,
                });
            }
        };

        let mut documents = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io {
                operation: "list",
                path: dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            documents.push(match kind {
                DocumentKind::File => DocumentRef::file(stem),
                DocumentKind::Participant => DocumentRef::participant(stem),
            });
        }
        documents.sort();
        Ok(documents)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = File::create(&temp_path).map_err(|e| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(bytes).map_err(|e| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| StoreError::AtomicWriteFailed {
        temp_path,
        target_path: path.to_path_buf(),
        source: e,
    })
}
