//! Job handle and local poll state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::RunStatus;
use crate::domain::foundation::{RunId, ThreadId};

/// Status checks allowed before a job is given up on.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 600;

/// Identifies a remote run within its thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle {
    pub thread_id: ThreadId,
    pub run_id: RunId,
}

impl JobHandle {
    pub fn new(thread_id: ThreadId, run_id: RunId) -> Self {
        Self { thread_id, run_id }
    }
}

/// Outcome of feeding one observed status into [`PollState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    /// Terminal success observed.
    Completed,
    /// Terminal non-success observed.
    RemoteFailure(RunStatus),
    /// Not done yet and budget remains.
    Continue,
    /// Budget spent without reaching success.
    Exhausted,
}

/// Local, per-invocation poll bookkeeping.
///
/// `attempts` counts status checks that did not return success. The state
/// is exhausted exactly when `attempts == max_attempts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    attempts: u32,
    max_attempts: u32,
    last_status: Option<RunStatus>,
}

impl PollState {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            last_status: None,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn last_status(&self) -> Option<RunStatus> {
        self.last_status
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Records one status check.
    pub fn observe(&mut self, status: RunStatus) -> PollStep {
        self.last_status = Some(status);

        if status.is_success() {
            return PollStep::Completed;
        }
        if status.is_terminal() {
            return PollStep::RemoteFailure(status);
        }

        self.attempts += 1;
        if self.is_exhausted() {
            PollStep::Exhausted
        } else {
            PollStep::Continue
        }
    }
}

impl Default for PollState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Pause inserted between two status checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollDelay {
    /// Check again immediately.
    #[default]
    None,
    /// Same pause after every check.
    Fixed(Duration),
    /// Doubling pause starting at `initial`, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

impl PollDelay {
    /// Pause after the `attempt`-th unsuccessful check (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match *self {
            PollDelay::None => Duration::ZERO,
            PollDelay::Fixed(delay) => delay,
            PollDelay::Exponential { initial, max } => {
                let exponent = attempt.saturating_sub(1).min(31);
                initial.saturating_mul(1u32 << exponent).min(max)
            }
        }
    }

    /// Total pause of a poll that uses all `max_attempts` checks.
    ///
    /// No pause follows the final check.
    pub fn total_sleep(&self, max_attempts: u32) -> Duration {
        (1..max_attempts).fold(Duration::ZERO, |total, attempt| {
            total.saturating_add(self.delay_after(attempt))
        })
    }
}
