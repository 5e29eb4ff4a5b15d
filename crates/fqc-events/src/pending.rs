//! Buffer of submissions waiting for their QC outcome.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use fqc_model::VisitKey;

/// A submission seen before its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVisit {
    pub visit_key: VisitKey,
    pub upload_timestamp: DateTime<Utc>,
    pub project_label: String,
    pub center_label: String,
    pub pipeline_adcid: i64,
    pub module: String,
    pub raw_source_filename: String,
    pub visitnum: Option<String>,
    pub packet: Option<String>,
}

/// Unmatched submissions keyed by visit.
///
/// Lives for one run; whatever is still here at the end is reported, not
/// carried over.
#[derive(Debug, Default)]
pub struct PendingVisits {
    entries: HashMap<VisitKey, PendingVisit>,
}

impl PendingVisits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pending visit, returning the entry it replaced.
    pub fn add(&mut self, visit_key: VisitKey, pending: PendingVisit) -> Option<PendingVisit> {
        self.entries.insert(visit_key, pending)
    }

    pub fn find_and_remove(&mut self, visit_key: &VisitKey) -> Option<PendingVisit> {
        self.entries.remove(visit_key)
    }

    pub fn contains(&self, visit_key: &VisitKey) -> bool {
        self.entries.contains_key(visit_key)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Remaining entries, ordered by visit key.
    pub fn get_remaining(&self) -> Vec<&PendingVisit> {
        let mut remaining: Vec<_> = self.entries.values().collect();
        remaining.sort_by(|a, b| a.visit_key.cmp(&b.visit_key));
        remaining
    }

    /// Drain every remaining entry, ordered by visit key.
    pub fn drain(&mut self) -> Vec<PendingVisit> {
        let mut remaining: Vec<_> = self.entries.drain().map(|(_, pending)| pending).collect();
        remaining.sort_by(|a, b| a.visit_key.cmp(&b.visit_key));
        remaining
    }
}
