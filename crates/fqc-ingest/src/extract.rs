//! Visit metadata extraction.
//!
//! A visit's identity can come from three places, tried in this order:
//!
//! 1. inline metadata already attached to the visit's qc-status log
//! 2. the form fields of the visit's JSON data file
//! 3. the qc-status log file name
//!
//! The first source that yields ptid, date and module wins; sources are never
//! merged. A source that is missing, malformed or incomplete is skipped.

use serde_json::Value;
use tracing::debug;

use fqc_model::{VisitMetadata, normalize_module};

use crate::qc_log::parse_qc_log_filename;

/// Key under which a qc-status log document stores its visit metadata.
pub const VISIT_METADATA_KEY: &str = "visit";

/// Candidate sources for one visit's metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitSources<'a> {
    /// Custom metadata document of the qc-status log artifact.
    pub inline: Option<&'a Value>,
    /// Contents of the visit's JSON form file.
    pub json_file: Option<&'a Value>,
    /// File name of the qc-status log artifact.
    pub log_filename: Option<&'a str>,
}

impl<'a> VisitSources<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_inline(mut self, inline: &'a Value) -> Self {
        self.inline = Some(inline);
        self
    }

    #[must_use]
    pub fn with_json_file(mut self, json_file: &'a Value) -> Self {
        self.json_file = Some(json_file);
        self
    }

    #[must_use]
    pub fn with_log_filename(mut self, log_filename: &'a str) -> Self {
        self.log_filename = Some(log_filename);
        self
    }
}

/// Extract visit metadata from the highest-priority usable source.
pub fn extract(sources: &VisitSources<'_>) -> Option<VisitMetadata> {
    if let Some(metadata) = sources.inline.and_then(from_inline) {
        return Some(metadata);
    }
    if let Some(metadata) = sources.json_file.and_then(|form| from_object(form, "json file")) {
        return Some(metadata);
    }
    if let Some(name) = sources.log_filename {
        match parse_qc_log_filename(name) {
            Some(metadata) => return Some(metadata),
            None => debug!(file = name, "file name is not a qc-status log name"),
        }
    }
    None
}

fn from_inline(document: &Value) -> Option<VisitMetadata> {
    let candidate = document.get(VISIT_METADATA_KEY).unwrap_or(document);
    from_object(candidate, "inline metadata")
}

fn from_object(value: &Value, source: &'static str) -> Option<VisitMetadata> {
    if !value.is_object() {
        debug!(source, "visit metadata source is not an object");
        return None;
    }
    match serde_json::from_value::<VisitMetadata>(value.clone()) {
        Ok(mut metadata) if metadata.is_valid_for_event() => {
            metadata.module = metadata.module.as_deref().map(normalize_module);
            Some(metadata)
        }
        Ok(_) => {
            debug!(source, "visit metadata source lacks ptid, date or module");
            None
        }
        Err(error) => {
            debug!(source, %error, "visit metadata source failed to parse");
            None
        }
    }
}
