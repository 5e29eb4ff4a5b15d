//! Downstream validation stage interface.

use std::fmt;

use serde_json::Value;

use crate::error::TriggerError;

/// Identifier of a launched validation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Complete,
    Failed,
}

/// A request to run one validation gear over one visit's file.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub gear_name: String,
    /// Gear configuration, passed through as given in the module config.
    pub config: Value,
    pub inputs: Vec<String>,
    /// Container the job is attached to (the participant).
    pub destination: String,
}

/// Launches and polls downstream validation jobs.
///
/// The validation gear writes its own outcome into the file's QC record; the
/// trigger only reports whether the job ran to completion.
pub trait ValidationTrigger {
    fn trigger(&mut self, request: &JobRequest) -> Result<JobId, TriggerError>;

    fn poll(&mut self, job: &JobId) -> Result<JobState, TriggerError>;

    /// Stop a job that is no longer waited for.
    ///
    /// After this returns the job must not write to the store anymore.
    /// Cancelling a job that already finished is not an error.
    fn cancel(&mut self, job: &JobId) -> Result<(), TriggerError>;
}
