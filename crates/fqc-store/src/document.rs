use std::fmt;

use serde::{Deserialize, Serialize};

/// What a metadata document describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// An uploaded file (form JSON, qc-status log, CSV).
    File,
    /// A participant container.
    Participant,
}

impl DocumentKind {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Participant => "participant",
        }
    }
}

/// Reference to one document in the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentRef {
    kind: DocumentKind,
    name: String,
}

impl DocumentRef {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::File,
            name: name.into(),
        }
    }

    pub fn participant(ptid: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Participant,
            name: ptid.into(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.label(), self.name)
    }
}
