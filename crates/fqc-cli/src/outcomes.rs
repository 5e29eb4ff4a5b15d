//! Outcome events for the qc-status logs in a store.
//!
//! A log is finalized when this run recorded a submission for its visit, or
//! when its file status differs from the status the last outcome event was
//! emitted for. Logs whose gears have not finished are left for a later run.

use fqc_events::EventAccumulator;
use fqc_ingest::{VisitSources, extract, is_qc_log_filename};
use fqc_model::FileQcModel;
use fqc_store::{DocumentKind, MetadataStore, Result, emitted_outcome, set_emitted_outcome};
use tracing::{debug, info, warn};

use crate::logging::redact_value;

/// Counts of one pass over the store's qc-status logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeScan {
    pub finalized: usize,
    /// Logs whose outcome event was already emitted for the current status.
    pub unchanged: usize,
    /// Logs where no gear has finished yet.
    pub unfinished: usize,
    /// Logs that could not be read or parsed.
    pub skipped: usize,
}

pub fn finalize_store_outcomes(
    store: &dyn MetadataStore,
    accumulator: &mut EventAccumulator<'_>,
) -> Result<OutcomeScan> {
    let mut scan = OutcomeScan::default();
    let logs = store.list_documents(DocumentKind::File)?;
    for doc in logs.iter().filter(|doc| is_qc_log_filename(doc.name())) {
        let document = match store.get_document(doc) {
            Ok(document) => document,
            Err(error) => {
                warn!(file = doc.name(), %error, "skipping unreadable QC log");
                scan.skipped += 1;
                continue;
            }
        };
        let record = match FileQcModel::from_document(&document) {
            Ok(record) => record,
            Err(error) => {
                warn!(file = doc.name(), %error, "skipping malformed QC record");
                scan.skipped += 1;
                continue;
            }
        };
        let Some(status) = record.finished_file_status() else {
            debug!(file = doc.name(), "no gear has finished");
            scan.unfinished += 1;
            continue;
        };

        let sources = VisitSources::new()
            .with_inline(&document)
            .with_log_filename(doc.name());
        let submitted = extract(&sources)
            .and_then(|metadata| metadata.visit_key())
            .is_some_and(|key| accumulator.pending().contains(&key));
        if !submitted && emitted_outcome(&document) == Some(status) {
            scan.unchanged += 1;
            continue;
        }

        if let Some(finalized) = accumulator.finalize(&sources, status) {
            info!(
                ptid = %redact_value(finalized.visit_key.ptid()),
                outcome = %finalized.outcome,
                submitted = finalized.submitted,
                "visit finalized"
            );
            set_emitted_outcome(store, doc.name(), status)?;
            scan.finalized += 1;
        }
    }
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fqc_events::{EventAction, EventContext, FixedClock, MemoryEventSink};
    use fqc_model::VisitMetadata;
    use fqc_store::{DocumentRef, InMemoryStore};
    use serde_json::{Value, json};

    fn log(state: Value) -> Value {
        json!({"qc": {"form-qc-checker": {"validation": {"state": state, "data": []}}}})
    }

    fn run(store: &InMemoryStore, submissions: &[VisitMetadata]) -> (OutcomeScan, Vec<EventAction>) {
        let mut sink = MemoryEventSink::new();
        let mut accumulator = EventAccumulator::new(&mut sink, EventContext::new("proj", "ctr", 7))
            .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()));
        let uploaded = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        for visit in submissions {
            assert!(accumulator.record_submission(visit, uploaded, "upload.csv"));
        }
        let scan = finalize_store_outcomes(store, &mut accumulator).unwrap();
        let _ = accumulator.finish();
        let actions = sink.events().iter().map(|event| event.action).collect();
        (scan, actions)
    }

    #[test]
    fn repeated_runs_emit_each_outcome_once() {
        let store = InMemoryStore::new();
        store
            .insert(DocumentRef::file("P1_2024-01-01_uds_qc-status.log"), log(json!("PASS")))
            .unwrap();
        store
            .insert(DocumentRef::file("P2_2024-01-01_uds_qc-status.log"), log(json!("FAIL")))
            .unwrap();

        let (first, actions) = run(&store, &[VisitMetadata::new("P1", "2024-01-01", "UDS")]);
        assert_eq!(first.finalized, 2);
        assert_eq!(
            actions,
            vec![EventAction::Submit, EventAction::PassQc, EventAction::NotPassQc]
        );

        let (second, actions) = run(&store, &[]);
        assert_eq!(second.finalized, 0);
        assert_eq!(second.unchanged, 2);
        assert!(actions.is_empty());
    }

    #[test]
    fn status_change_or_resubmission_emits_again() {
        let store = InMemoryStore::new();
        let name = "P1_2024-01-01_uds_qc-status.log";
        store.insert(DocumentRef::file(name), log(json!("FAIL"))).unwrap();
        run(&store, &[]);

        let mut document = store.get_document(&DocumentRef::file(name)).unwrap();
        document["qc"]["form-qc-checker"]["validation"]["state"] = json!("PASS");
        store.insert(DocumentRef::file(name), document).unwrap();
        let (_, actions) = run(&store, &[]);
        assert_eq!(actions, vec![EventAction::PassQc]);

        let (_, actions) = run(&store, &[VisitMetadata::new("P1", "2024-01-01", "uds")]);
        assert_eq!(actions, vec![EventAction::Submit, EventAction::PassQc]);
    }

    #[test]
    fn unfinished_log_emits_nothing() {
        let store = InMemoryStore::new();
        store
            .insert(DocumentRef::file("P1_2024-01-01_uds_qc-status.log"), log(Value::Null))
            .unwrap();

        let (scan, actions) = run(&store, &[]);
        assert_eq!(scan.unfinished, 1);
        assert!(actions.is_empty());
    }
}
