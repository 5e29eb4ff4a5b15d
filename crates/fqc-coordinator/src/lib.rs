//! QC coordination of dependent visits.
//!
//! [`QcCoordinator::run`] takes the pending visits of one participant and
//! module, validates them one at a time in visit-date order through a
//! [`ValidationTrigger`], and cascades the first failure to every later visit
//! as BLOCKED.

pub mod coordinator;
pub mod error;
pub mod registry;
pub mod supplement;
pub mod trigger;
pub mod visit;
pub mod wait;

pub use coordinator::{DEFAULT_GEAR_NAME, QcCoordinator};
pub use error::{CoordinatorError, Result, TriggerError};
pub use registry::{ModuleConfig, ModuleRegistry};
pub use supplement::{
    StoreSupplementResolver, SupplementQuery, SupplementResolver, VisitLookupCache,
};
pub use trigger::{JobId, JobRequest, JobState, ValidationTrigger};
pub use visit::{CoordinationReport, VisitDescriptor, VisitOutcome, VisitState};
pub use wait::{
    DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL, Sleeper, ThreadSleeper, WaitOutcome, WaitPolicy,
    wait_for_job,
};
