//! The QC coordinator.
//!
//! Runs the visits of one participant/module sequence strictly in visit-date
//! order. The first visit that fails stops the sequence: every later visit is
//! marked BLOCKED without being validated, and the failing visit is recorded
//! on the participant so a re-submission knows where to resume.

use fqc_model::{FileError, QcStatus, ValidationModel, normalize_module};
use fqc_store::{
    LastFailedVisit, MetadataStore, last_failed_visit, read_gear_status, set_last_failed_visit,
    write_gear_validation,
};
use tracing::{debug, info, info_span, warn};

use crate::error::{CoordinatorError, Result};
use crate::registry::{ModuleConfig, ModuleRegistry};
use crate::supplement::{
    StoreSupplementResolver, SupplementQuery, SupplementResolver, VisitLookupCache,
};
use crate::trigger::{JobRequest, ValidationTrigger};
use crate::visit::{CoordinationReport, VisitDescriptor, VisitOutcome, VisitState};
use crate::wait::{Sleeper, ThreadSleeper, WaitOutcome, WaitPolicy, wait_for_job};

/// Gear name the coordinator records its own outcomes under.
pub const DEFAULT_GEAR_NAME: &str = "form-qc-coordinator";

pub struct QcCoordinator<'a> {
    store: &'a dyn MetadataStore,
    trigger: &'a mut dyn ValidationTrigger,
    registry: &'a ModuleRegistry,
    resolver: Box<dyn SupplementResolver + 'a>,
    sleeper: Box<dyn Sleeper + 'a>,
    cache: VisitLookupCache,
    policy: WaitPolicy,
    gear_name: String,
}

impl<'a> QcCoordinator<'a> {
    pub fn new(
        store: &'a dyn MetadataStore,
        trigger: &'a mut dyn ValidationTrigger,
        registry: &'a ModuleRegistry,
        cache: VisitLookupCache,
    ) -> Self {
        Self {
            store,
            trigger,
            registry,
            resolver: Box::new(StoreSupplementResolver::new(store)),
            sleeper: Box::new(ThreadSleeper),
            cache,
            policy: WaitPolicy::default(),
            gear_name: DEFAULT_GEAR_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_gear_name(mut self, gear_name: impl Into<String>) -> Self {
        self.gear_name = gear_name.into();
        self
    }

    #[must_use]
    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'a) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: impl SupplementResolver + 'a) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn cache(&self) -> &VisitLookupCache {
        &self.cache
    }

    pub fn into_cache(self) -> VisitLookupCache {
        self.cache
    }

    /// Coordinate one participant/module sequence.
    ///
    /// Returns `Err` only for conditions that abort the run: an unknown
    /// module, a visit from another sequence, an ambiguous supplement match,
    /// or a store failure. Visit failures are reported in the returned
    /// [`CoordinationReport`].
    pub fn run(
        &mut self,
        ptid: &str,
        module: &str,
        visits: Vec<VisitDescriptor>,
    ) -> Result<CoordinationReport> {
        let registry = self.registry;
        let config = registry.get(module)?;
        let module = normalize_module(module);
        let span = info_span!("coordinate", module = %module, visits = visits.len());
        let _guard = span.enter();

        check_sequence(ptid, &module, &visits)?;

        let mut visits = visits;
        visits.sort_by(|a, b| a.visit_date.cmp(&b.visit_date));

        let mut report = CoordinationReport {
            ptid: ptid.to_string(),
            module: module.clone(),
            outcomes: Vec::with_capacity(visits.len()),
            triggered: 0,
        };

        let mut remaining = visits.into_iter();
        while let Some(visit) = remaining.next() {
            let (state, errors) = self.evaluate(config, &visit, &mut report.triggered)?;
            self.record(&visit, state, &errors)?;

            if state == VisitState::Failed {
                info!(
                    file = %visit.file,
                    date = %visit.visit_date,
                    "visit failed, blocking later visits"
                );
                set_last_failed_visit(
                    self.store,
                    ptid,
                    &module,
                    Some(&LastFailedVisit {
                        file: visit.file.clone(),
                        visit_date: visit.visit_date.clone(),
                        visitnum: visit.visitnum.clone(),
                    }),
                )?;
                let failed_file = visit.file.clone();
                report.outcomes.push(VisitOutcome {
                    visit,
                    state,
                    errors,
                });

                for blocked in remaining.by_ref() {
                    let errors =
                        vec![FileError::visit_blocked(&failed_file, &blocked.metadata())];
                    self.record(&blocked, VisitState::Blocked, &errors)?;
                    report.outcomes.push(VisitOutcome {
                        visit: blocked,
                        state: VisitState::Blocked,
                        errors,
                    });
                }
                break;
            }

            self.clear_last_failed(ptid, &module, &visit)?;
            report.outcomes.push(VisitOutcome {
                visit,
                state,
                errors,
            });
        }

        info!(
            passed = report.count(VisitState::Passed),
            failed = report.count(VisitState::Failed),
            blocked = report.count(VisitState::Blocked),
            triggered = report.triggered,
            "coordination finished"
        );
        Ok(report)
    }

    /// Run one visit to a terminal state: `Passed` or `Failed`.
    fn evaluate(
        &mut self,
        config: &ModuleConfig,
        visit: &VisitDescriptor,
        triggered: &mut usize,
    ) -> Result<(VisitState, Vec<FileError>)> {
        let metadata = visit.metadata();

        if let Some(supplement) = &config.supplement {
            let query = SupplementQuery::new(
                supplement,
                visit.ptid.as_str(),
                visit.visit_date.as_str(),
                visit.visitnum.clone(),
            );
            let found = self.cache.get_or_resolve(&query, self.resolver.as_ref())?;
            match found {
                Some(file) => {
                    debug!(file = %visit.file, supplement_file = %file, "supplement approved");
                }
                None => {
                    info!(file = %visit.file, %supplement, "no approved supplement visit");
                    return Ok((
                        VisitState::Failed,
                        vec![FileError::supplement_not_approved(supplement, &metadata)],
                    ));
                }
            }
        }

        debug!(file = %visit.file, gear = %config.validation_gear, "running visit");
        let request = JobRequest {
            gear_name: config.validation_gear.clone(),
            config: config.config.clone(),
            inputs: vec![visit.file.clone()],
            destination: visit.ptid.clone(),
        };
        *triggered += 1;
        let job = match self.trigger.trigger(&request) {
            Ok(job) => job,
            Err(error) => {
                warn!(file = %visit.file, %error, "validation trigger failed");
                return Ok((
                    VisitState::Failed,
                    vec![FileError::system_error(error.to_string(), &metadata)],
                ));
            }
        };

        match wait_for_job(&mut *self.trigger, &job, &self.policy, self.sleeper.as_mut()) {
            WaitOutcome::Complete => {}
            WaitOutcome::Failed => {
                warn!(file = %visit.file, %job, "validation job failed");
                let message = format!("{} job {job} failed", config.validation_gear);
                return Ok((
                    VisitState::Failed,
                    vec![FileError::system_error(message, &metadata)],
                ));
            }
            WaitOutcome::TimedOut { waited } => {
                warn!(file = %visit.file, %job, ?waited, "validation job timed out");
                // The job must be gone before this visit's record is written.
                if let Err(error) = self.trigger.cancel(&job) {
                    warn!(file = %visit.file, %job, %error, "failed to cancel validation job");
                }
                let message = format!(
                    "{} job {job} did not finish within {}s",
                    config.validation_gear,
                    waited.as_secs()
                );
                return Ok((
                    VisitState::Failed,
                    vec![FileError::system_error(message, &metadata)],
                ));
            }
        }

        match read_gear_status(self.store, &visit.file, &config.validation_gear)? {
            Some(QcStatus::Pass | QcStatus::InReview) => Ok((VisitState::Passed, Vec::new())),
            Some(QcStatus::Fail) => Ok((VisitState::Failed, Vec::new())),
            None => Ok((
                VisitState::Failed,
                vec![FileError::missing_qc_status(
                    &config.validation_gear,
                    &metadata,
                )],
            )),
        }
    }

    /// Write the coordinator's own QC entry for a visit.
    fn record(
        &self,
        visit: &VisitDescriptor,
        state: VisitState,
        errors: &[FileError],
    ) -> Result<()> {
        let validation = match state {
            VisitState::Passed => ValidationModel::passed(),
            _ => ValidationModel::failed(errors.to_vec()),
        };
        write_gear_validation(self.store, &visit.file, &self.gear_name, validation)?;
        debug!(file = %visit.file, %state, "recorded visit outcome");
        Ok(())
    }

    /// A visit that failed in an earlier run and now passes is no longer the
    /// resume point.
    fn clear_last_failed(&self, ptid: &str, module: &str, visit: &VisitDescriptor) -> Result<()> {
        let Some(last) = last_failed_visit(self.store, ptid, module)? else {
            return Ok(());
        };
        if last.file == visit.file {
            info!(file = %visit.file, "previously failed visit now passes");
            set_last_failed_visit(self.store, ptid, module, None)?;
        }
        Ok(())
    }
}

fn check_sequence(ptid: &str, module: &str, visits: &[VisitDescriptor]) -> Result<()> {
    for visit in visits {
        let found_module = normalize_module(&visit.module);
        if visit.ptid != ptid || found_module != module {
            return Err(CoordinatorError::MixedSequence {
                file: visit.file.clone(),
                expected: format!("{ptid}/{module}"),
                found: format!("{}/{found_module}", visit.ptid),
            });
        }
    }
    Ok(())
}
