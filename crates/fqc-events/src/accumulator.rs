//! Pairing of submissions with QC outcomes.
//!
//! A visit's submission is recorded when its upload is seen; its outcome when
//! its pipeline finishes. [`EventAccumulator::finalize`] emits the submit
//! event (stamped with the upload time) only if the submission was recorded
//! in this run, then always emits the outcome event (stamped with the current
//! time). A re-evaluated visit therefore gets an outcome event and no invented
//! submit event.

use chrono::{DateTime, Utc};
use fqc_ingest::{VisitSources, extract};
use fqc_model::{QcStatus, VisitKey, VisitMetadata};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn};

use crate::clock::{Clock, SystemClock};
use crate::event::{EventAction, FORM_DATATYPE, VisitEvent};
use crate::pending::{PendingVisit, PendingVisits};
use crate::sink::EventSink;

/// Default gear name stamped on events.
pub const DEFAULT_EVENT_GEAR: &str = "form-scheduler";

/// Run-wide labels stamped on every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    pub project_label: String,
    pub center_label: String,
    pub pipeline_adcid: i64,
    pub gear_name: String,
}

impl EventContext {
    pub fn new(
        project_label: impl Into<String>,
        center_label: impl Into<String>,
        pipeline_adcid: i64,
    ) -> Self {
        Self {
            project_label: project_label.into(),
            center_label: center_label.into(),
            pipeline_adcid,
            gear_name: DEFAULT_EVENT_GEAR.to_string(),
        }
    }

    #[must_use]
    pub fn with_gear_name(mut self, gear_name: impl Into<String>) -> Self {
        self.gear_name = gear_name.into();
        self
    }
}

/// Counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccumulatorStats {
    pub submissions: usize,
    pub finalized: usize,
    pub submit_events: usize,
    pub outcome_events: usize,
    pub sink_failures: usize,
    /// Finalize calls whose visit identity could not be determined.
    pub unidentified: usize,
}

/// What one finalize call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    pub visit_key: VisitKey,
    pub submitted: bool,
    pub outcome: EventAction,
}

pub struct EventAccumulator<'a> {
    pending: PendingVisits,
    sink: &'a mut dyn EventSink,
    clock: Box<dyn Clock + 'a>,
    context: EventContext,
    stats: AccumulatorStats,
}

impl<'a> EventAccumulator<'a> {
    pub fn new(sink: &'a mut dyn EventSink, context: EventContext) -> Self {
        Self {
            pending: PendingVisits::new(),
            sink,
            clock: Box::new(SystemClock),
            context,
            stats: AccumulatorStats::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'a) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn pending(&self) -> &PendingVisits {
        &self.pending
    }

    pub fn stats(&self) -> AccumulatorStats {
        self.stats
    }

    /// Remember a submitted visit until its outcome arrives.
    ///
    /// Returns `false` when the metadata does not identify a visit.
    pub fn record_submission(
        &mut self,
        metadata: &VisitMetadata,
        upload_timestamp: DateTime<Utc>,
        raw_source_filename: &str,
    ) -> bool {
        let Some(visit_key) = metadata.visit_key() else {
            warn!(file = raw_source_filename, "submission has no usable visit identity");
            return false;
        };
        let pending = PendingVisit {
            visit_key: visit_key.clone(),
            upload_timestamp,
            project_label: self.context.project_label.clone(),
            center_label: self.context.center_label.clone(),
            pipeline_adcid: metadata.adcid.unwrap_or(self.context.pipeline_adcid),
            module: visit_key.module().to_string(),
            raw_source_filename: raw_source_filename.to_string(),
            visitnum: metadata.visitnum.clone(),
            packet: metadata.packet.clone(),
        };
        if self.pending.add(visit_key.clone(), pending).is_some() {
            debug!(visit = %visit_key, "replaced pending submission");
        }
        self.stats.submissions += 1;
        true
    }

    /// Emit the events for a visit whose pipeline has finished.
    ///
    /// Returns `None` when no source identifies the visit. Sink failures are
    /// logged and counted; they never stop the caller.
    pub fn finalize(&mut self, sources: &VisitSources<'_>, status: QcStatus) -> Option<Finalized> {
        let Some(metadata) = extract(sources) else {
            warn!(
                file = sources.log_filename.unwrap_or("-"),
                "cannot determine visit for QC outcome"
            );
            self.stats.unidentified += 1;
            return None;
        };
        let visit_key = metadata.visit_key()?;
        let span = info_span!("finalize", visit = %visit_key, %status);
        let _guard = span.enter();

        let pending = self.pending.find_and_remove(&visit_key);
        let submitted = pending.is_some();
        if let Some(pending) = &pending {
            let event = self.submit_event(&visit_key, &metadata, pending);
            self.emit(&event);
            self.stats.submit_events += 1;
        } else {
            debug!("no pending submission, emitting outcome only");
        }

        let outcome = EventAction::outcome(status);
        let event = self.outcome_event(&visit_key, &metadata, pending.as_ref(), outcome);
        self.emit(&event);
        self.stats.outcome_events += 1;
        self.stats.finalized += 1;

        Some(Finalized {
            visit_key,
            submitted,
            outcome,
        })
    }

    /// End the run, returning the submissions that never saw an outcome.
    pub fn finish(mut self) -> (Vec<PendingVisit>, AccumulatorStats) {
        let remaining = self.pending.drain();
        for pending in &remaining {
            warn!(
                visit = %pending.visit_key,
                file = %pending.raw_source_filename,
                "submission without QC outcome"
            );
        }
        (remaining, self.stats)
    }

    fn emit(&mut self, event: &VisitEvent) {
        if let Err(error) = self.sink.log_event(event) {
            warn!(action = %event.action, ptid = %event.ptid, %error, "event sink failed");
            self.stats.sink_failures += 1;
        }
    }

    fn submit_event(
        &self,
        visit_key: &VisitKey,
        metadata: &VisitMetadata,
        pending: &PendingVisit,
    ) -> VisitEvent {
        VisitEvent {
            action: EventAction::Submit,
            ptid: visit_key.ptid().to_string(),
            visit_date: visit_key.date().to_string(),
            visit_number: metadata.visitnum.clone().or_else(|| pending.visitnum.clone()),
            module: visit_key.module().to_string(),
            packet: metadata.packet.clone().or_else(|| pending.packet.clone()),
            pipeline_adcid: pending.pipeline_adcid,
            project_label: pending.project_label.clone(),
            center_label: pending.center_label.clone(),
            gear_name: self.context.gear_name.clone(),
            datatype: FORM_DATATYPE.to_string(),
            timestamp: pending.upload_timestamp,
        }
    }

    fn outcome_event(
        &self,
        visit_key: &VisitKey,
        metadata: &VisitMetadata,
        pending: Option<&PendingVisit>,
        action: EventAction,
    ) -> VisitEvent {
        VisitEvent {
            action,
            ptid: visit_key.ptid().to_string(),
            visit_date: visit_key.date().to_string(),
            visit_number: metadata
                .visitnum
                .clone()
                .or_else(|| pending.and_then(|p| p.visitnum.clone())),
            module: visit_key.module().to_string(),
            packet: metadata
                .packet
                .clone()
                .or_else(|| pending.and_then(|p| p.packet.clone())),
            pipeline_adcid: metadata.adcid.unwrap_or(self.context.pipeline_adcid),
            project_label: self.context.project_label.clone(),
            center_label: self.context.center_label.clone(),
            gear_name: self.context.gear_name.clone(),
            datatype: FORM_DATATYPE.to_string(),
            timestamp: self.clock.now(),
        }
    }
}
