//! Validation gear run as a local child process.
//!
//! Each triggered job spawns
//! `<command...> <gear_name> <destination> <inputs...>` with the gear's
//! configuration as JSON in [`GEAR_CONFIG_ENV`]. Exit status 0 is COMPLETE,
//! anything else FAILED.

use std::collections::HashMap;
use std::process::{Child, Command, Stdio};

use fqc_coordinator::{JobId, JobRequest, JobState, TriggerError, ValidationTrigger};
use tracing::{debug, warn};

pub const GEAR_CONFIG_ENV: &str = "FQC_GEAR_CONFIG";

pub struct ProcessTrigger {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    jobs: HashMap<String, Child>,
    launched: u64,
}

impl ProcessTrigger {
    /// Build from a command line; `None` when it is empty.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            envs: Vec::new(),
            jobs: HashMap::new(),
            launched: 0,
        })
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn running(&self) -> usize {
        self.jobs.len()
    }
}

impl ValidationTrigger for ProcessTrigger {
    fn trigger(&mut self, request: &JobRequest) -> Result<JobId, TriggerError> {
        let launch_error = |message: String| TriggerError::Launch {
            gear: request.gear_name.clone(),
            message,
        };
        let config =
            serde_json::to_string(&request.config).map_err(|e| launch_error(e.to_string()))?;

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&request.gear_name)
            .arg(&request.destination)
            .args(&request.inputs)
            .env(GEAR_CONFIG_ENV, config)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| launch_error(format!("{}: {e}", self.program)))?;

        self.launched += 1;
        let id = format!("{}-{}-{}", request.gear_name, child.id(), self.launched);
        debug!(job = %id, "spawned validation job");
        self.jobs.insert(id.clone(), child);
        Ok(JobId::new(id))
    }

    fn poll(&mut self, job: &JobId) -> Result<JobState, TriggerError> {
        let poll_error = |message: String| TriggerError::Poll {
            job: job.to_string(),
            message,
        };
        let child = self
            .jobs
            .get_mut(job.as_str())
            .ok_or_else(|| poll_error("unknown job".to_string()))?;

        match child.try_wait() {
            Ok(None) => Ok(JobState::Running),
            Ok(Some(status)) => {
                self.jobs.remove(job.as_str());
                debug!(%job, %status, "validation job exited");
                Ok(if status.success() {
                    JobState::Complete
                } else {
                    JobState::Failed
                })
            }
            Err(e) => Err(poll_error(e.to_string())),
        }
    }

    /// Kill the job's process and reap it; jobs that already exited are a no-op.
    fn cancel(&mut self, job: &JobId) -> Result<(), TriggerError> {
        let Some(mut child) = self.jobs.remove(job.as_str()) else {
            return Ok(());
        };
        if let Ok(Some(status)) = child.try_wait() {
            debug!(%job, %status, "validation job exited before cancel");
            return Ok(());
        }
        let cancel_error = |message: String| TriggerError::Cancel {
            job: job.to_string(),
            message,
        };
        child.kill().map_err(|e| cancel_error(e.to_string()))?;
        child.wait().map_err(|e| cancel_error(e.to_string()))?;
        debug!(%job, "cancelled validation job");
        Ok(())
    }
}

impl Drop for ProcessTrigger {
    fn drop(&mut self) {
        for (id, child) in &mut self.jobs {
            if let Err(error) = child.kill() {
                warn!(job = %id, %error, "failed to kill validation job");
            }
            let _ = child.wait();
        }
    }
}
