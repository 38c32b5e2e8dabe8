//! Job errors.

use std::fmt;
use thiserror::Error;

use super::RunStatus;
use crate::domain::dispatch::CommandError;
use crate::domain::foundation::{RunId, ThreadId};

/// Phase of the submit / poll / fetch workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobPhase {
    Submit,
    Poll,
    Fetch,
}

impl JobPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Submit => "submit",
            JobPhase::Poll => "poll",
            JobPhase::Fetch => "fetch",
        }
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one job-completion run.
///
/// Every variant carries an HTTP-equivalent status so the dispatcher can
/// propagate it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// Posting the message or creating the run failed.
    #[error("job submission failed: {0}")]
    RemoteSubmission(String),

    /// The status budget ran out before success.
    #[error("run did not complete after {attempts} status checks")]
    PollTimeout { attempts: u32 },

    /// The run ended in a terminal non-success status.
    #[error("run {run_id} ended with status {status}")]
    RemoteFailure { run_id: RunId, status: RunStatus },

    /// The thread holds no assistant-authored message.
    #[error("no assistant message in thread {thread_id}")]
    NoAssistantMessage {
        thread_id: ThreadId,
        /// True when the thread has no messages at all.
        empty_thread: bool,
    },

    /// A status check or message fetch failed.
    #[error("remote call failed during {phase}: {message}")]
    RemoteCall { phase: JobPhase, message: String },
}

impl JobError {
    pub fn status_code(&self) -> u16 {
        match self {
            JobError::RemoteSubmission(_) => 500,
            JobError::PollTimeout { .. } => 408,
            JobError::RemoteFailure { .. } => 502,
            JobError::NoAssistantMessage { .. } => 404,
            JobError::RemoteCall { .. } => 500,
        }
    }

    /// Message sent to the client. Never contains provider detail.
    pub fn client_message(&self) -> String {
        match self {
            JobError::RemoteSubmission(_) => "Error submitting job".to_string(),
            JobError::PollTimeout { .. } => "Request timed out".to_string(),
            JobError::RemoteFailure { status, .. } => format!("Run ended with status {}", status),
            JobError::NoAssistantMessage {
                empty_thread: true, ..
            } => "No messages found in the thread".to_string(),
            JobError::NoAssistantMessage { .. } => {
                "No assistant messages found in the thread".to_string()
            }
            JobError::RemoteCall {
                phase: JobPhase::Fetch,
                ..
            } => "Error getting messages".to_string(),
            JobError::RemoteCall { .. } => "Error getting status".to_string(),
        }
    }
}

impl From<JobError> for CommandError {
    fn from(err: JobError) -> Self {
        CommandError::http(err.status_code(), err.client_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread() -> ThreadId {
        ThreadId::new("thread_1").unwrap()
    }

    #[test]
    fn timeout_is_408() {
        let err = JobError::PollTimeout { attempts: 600 };
        assert_eq!(err.status_code(), 408);
        assert_eq!(err.client_message(), "Request timed out");
    }

    #[test]
    fn missing_assistant_message_is_404() {
        let err = JobError::NoAssistantMessage {
            thread_id: thread(),
            empty_thread: false,
        };
        assert_eq!(err.status_code(), 404);
        assert_eq!(
            err.client_message(),
            "No assistant messages found in the thread"
        );

        let empty = JobError::NoAssistantMessage {
            thread_id: thread(),
            empty_thread: true,
        };
        assert_eq!(empty.status_code(), 404);
        assert_eq!(empty.client_message(), "No messages found in the thread");
    }

    #[test]
    fn remote_failure_is_502() {
        let err = JobError::RemoteFailure {
            run_id: RunId::new("run_1").unwrap(),
            status: RunStatus::Failed,
        };
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.client_message(), "Run ended with status failed");
    }

    #[test]
    fn client_message_hides_provider_detail() {
        let err = JobError::RemoteCall {
            phase: JobPhase::Poll,
            message: "401 invalid key sk-abc".to_string(),
        };
        assert_eq!(err.status_code(), 500);
        assert!(!err.client_message().contains("sk-abc"));
    }

    #[test]
    fn converts_to_typed_command_error() {
        let err: CommandError = JobError::PollTimeout { attempts: 3 }.into();
        assert_eq!(err, CommandError::http(408, "Request timed out"));
    }
}
