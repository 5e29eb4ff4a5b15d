//! Blocking wait for a triggered job, bounded by a deadline.

use std::time::Duration;

use tracing::{debug, warn};

use crate::trigger::{JobId, JobState, ValidationTrigger};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30 * 60);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Fixed-interval polling with an overall deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    poll_interval: Duration,
    max_wait: Duration,
}

impl WaitPolicy {
    pub fn new(poll_interval: Duration, max_wait: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            max_wait,
        }
    }

    pub fn from_secs(poll_interval_secs: u64, max_wait_secs: u64) -> Self {
        Self::new(
            Duration::from_secs(poll_interval_secs),
            Duration::from_secs(max_wait_secs),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_WAIT)
    }
}

/// Blocks the current thread between polls.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Complete,
    Failed,
    TimedOut { waited: Duration },
}

/// Poll a job until it reaches a terminal state or the deadline passes.
///
/// A failed poll is treated as an unknown state and retried on the next
/// interval; it never ends the wait early.
pub fn wait_for_job(
    trigger: &mut dyn ValidationTrigger,
    job: &JobId,
    policy: &WaitPolicy,
    sleeper: &mut dyn Sleeper,
) -> WaitOutcome {
    let mut waited = Duration::ZERO;
    loop {
        match trigger.poll(job) {
            Ok(JobState::Complete) => return WaitOutcome::Complete,
            Ok(JobState::Failed) => return WaitOutcome::Failed,
            Ok(JobState::Running) => debug!(%job, ?waited, "job still running"),
            Err(error) => warn!(%job, %error, "job poll failed, retrying"),
        }

        if waited >= policy.max_wait {
            return WaitOutcome::TimedOut { waited };
        }
        let step = policy.poll_interval.min(policy.max_wait - waited);
        sleeper.sleep(step);
        waited += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriggerError;
    use crate::trigger::JobRequest;

    struct Script(Vec<Result<JobState, TriggerError>>);

    impl ValidationTrigger for Script {
        fn trigger(&mut self, _request: &JobRequest) -> Result<JobId, TriggerError> {
            Ok(JobId::new("job"))
        }

        fn poll(&mut self, _job: &JobId) -> Result<JobState, TriggerError> {
            if self.0.is_empty() {
                Ok(JobState::Running)
            } else {
                self.0.remove(0)
            }
        }

        fn cancel(&mut self, _job: &JobId) -> Result<(), TriggerError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<Duration>);

    impl Sleeper for Recorder {
        fn sleep(&mut self, duration: Duration) {
            self.0.push(duration);
        }
    }

    #[test]
    fn completes_after_running_polls() {
        let mut trigger = Script(vec![
            Ok(JobState::Running),
            Err(TriggerError::Poll {
                job: "job".to_string(),
                message: "unavailable".to_string(),
            }),
            Ok(JobState::Complete),
        ]);
        let mut sleeper = Recorder::default();
        let policy = WaitPolicy::from_secs(5, 60);
        let outcome = wait_for_job(&mut trigger, &JobId::new("job"), &policy, &mut sleeper);
        assert_eq!(outcome, WaitOutcome::Complete);
        assert_eq!(sleeper.0, vec![Duration::from_secs(5); 2]);
    }

    #[test]
    fn times_out_at_deadline() {
        let mut trigger = Script(Vec::new());
        let mut sleeper = Recorder::default();
        let policy = WaitPolicy::from_secs(10, 25);
        let outcome = wait_for_job(&mut trigger, &JobId::new("job"), &policy, &mut sleeper);
        assert_eq!(
            outcome,
            WaitOutcome::TimedOut {
                waited: Duration::from_secs(25)
            }
        );
        assert_eq!(
            sleeper.0,
            vec![
                Duration::from_secs(10),
                Duration::from_secs(10),
                Duration::from_secs(5)
            ]
        );
    }

    #[test]
    fn zero_interval_still_advances() {
        let policy = WaitPolicy::new(Duration::ZERO, Duration::from_millis(3));
        assert_eq!(policy.poll_interval(), Duration::from_millis(1));
    }
}
