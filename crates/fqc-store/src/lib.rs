//! Metadata store access for form QC.
//!
//! The store holds one JSON document per file and per participant. It is
//! atomic per document only, so every update here is read-modify-write of
//! just the keys the caller owns.

pub mod directory;
pub mod document;
pub mod error;
pub mod memory;
pub mod outcome;
pub mod participant;
pub mod qc;
pub mod traits;

pub use directory::DirectoryStore;
pub use document::{DocumentKind, DocumentRef};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use outcome::{OUTCOME_EVENT_KEY, emitted_outcome, set_emitted_outcome};
pub use participant::{LastFailedVisit, last_failed_visit, set_last_failed_visit};
pub use qc::{read_gear_status, read_qc_record, read_qc_record_lenient, write_gear_validation};
pub use traits::{MetadataStore, get_or_empty};
