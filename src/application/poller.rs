//! Job-Completion Poller.
//!
//! Drives one remote job through three phases:
//!
//! 1. **Submit** - post the user message, then create a run
//! 2. **Poll** - check the run status until success, terminal failure, or
//!    the attempt budget runs out
//! 3. **Fetch** - read the newest assistant message and join its text
//!
//! Poll state lives on the stack of one invocation. Remote failures are
//! handed to the [`ErrorReporter`] and surface as [`JobError`]s, which carry
//! their own HTTP-equivalent status.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::assistant::{
    latest_assistant_text, JobError, JobHandle, JobPhase, PollDelay, PollState, PollStep,
    DEFAULT_MAX_ATTEMPTS,
};
use crate::domain::foundation::{AssistantId, ThreadId};
use crate::ports::{AssistantProvider, ErrorReporter, ProviderError};

/// Poll budget and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerSettings {
    pub max_attempts: u32,
    pub delay: PollDelay,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: PollDelay::None,
        }
    }
}

/// Input for one job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub thread_id: ThreadId,
    pub assistant_id: AssistantId,
    pub text: String,
    /// Per-run instructions passed to the provider.
    pub instructions: Option<String>,
}

/// Result of a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub handle: JobHandle,
    /// Status checks that did not return success.
    pub attempts: u32,
    pub text: String,
}

/// Runs submit / poll / fetch against an [`AssistantProvider`].
pub struct JobCompletionPoller {
    provider: Arc<dyn AssistantProvider>,
    reporter: Arc<dyn ErrorReporter>,
    settings: PollerSettings,
}

impl JobCompletionPoller {
    pub fn new(provider: Arc<dyn AssistantProvider>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            provider,
            reporter,
            settings: PollerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PollerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> PollerSettings {
        self.settings
    }

    /// Runs all three phases.
    pub async fn run(&self, request: &JobRequest) -> Result<JobOutcome, JobError> {
        let handle = self.submit(request).await?;
        self.complete(handle).await
    }

    /// Polls an already submitted job and fetches its reply.
    pub async fn complete(&self, handle: JobHandle) -> Result<JobOutcome, JobError> {
        let state = self.wait_for_completion(&handle).await?;
        let text = self.fetch_reply(&handle.thread_id).await?;

        Ok(JobOutcome {
            handle,
            attempts: state.attempts(),
            text,
        })
    }

    /// Submit phase: posts the message and creates a run.
    ///
    /// # Errors
    ///
    /// `JobError::RemoteSubmission` if either remote call fails. Polling is
    /// never entered in that case.
    pub async fn submit(&self, request: &JobRequest) -> Result<JobHandle, JobError> {
        self.provider
            .submit_message(&request.thread_id, &request.text)
            .await
            .map_err(|e| self.submission_failed("poller.submit_message", e))?;

        let run = self
            .provider
            .create_run(
                &request.thread_id,
                &request.assistant_id,
                request.instructions.as_deref(),
            )
            .await
            .map_err(|e| self.submission_failed("poller.create_run", e))?;

        tracing::debug!(
            thread_id = %run.thread_id,
            run_id = %run.id,
            provider = self.provider.provider_name(),
            "Run created"
        );

        Ok(run.handle())
    }

    /// Poll phase.
    ///
    /// Returns the final poll state on success. Fails with
    /// `JobError::PollTimeout` after exactly `max_attempts` unsuccessful
    /// checks, or `JobError::RemoteFailure` on a terminal non-success status.
    pub async fn wait_for_completion(&self, handle: &JobHandle) -> Result<PollState, JobError> {
        let mut state = PollState::new(self.settings.max_attempts);

        while !state.is_exhausted() {
            let status = self
                .provider
                .get_run_status(handle)
                .await
                .map_err(|e| self.call_failed(JobPhase::Poll, "poller.get_run_status", e))?;

            match state.observe(status) {
                PollStep::Completed => {
                    tracing::debug!(
                        thread_id = %handle.thread_id,
                        run_id = %handle.run_id,
                        attempts = state.attempts(),
                        "Run completed"
                    );
                    return Ok(state);
                }
                PollStep::RemoteFailure(status) => {
                    let err = JobError::RemoteFailure {
                        run_id: handle.run_id.clone(),
                        status,
                    };
                    self.reporter.report("poller.poll", &err);
                    return Err(err);
                }
                PollStep::Continue => {
                    let pause = self.settings.delay.delay_after(state.attempts());
                    if pause > Duration::ZERO {
                        tokio::time::sleep(pause).await;
                    }
                }
                PollStep::Exhausted => break,
            }
        }

        tracing::warn!(
            thread_id = %handle.thread_id,
            run_id = %handle.run_id,
            attempts = state.attempts(),
            last_status = ?state.last_status(),
            "Run did not complete within the attempt budget"
        );
        Err(JobError::PollTimeout {
            attempts: state.attempts(),
        })
    }

    /// Fetch phase: text of the newest assistant message.
    pub async fn fetch_reply(&self, thread_id: &ThreadId) -> Result<String, JobError> {
        let messages = self
            .provider
            .list_messages(thread_id)
            .await
            .map_err(|e| self.call_failed(JobPhase::Fetch, "poller.list_messages", e))?;

        latest_assistant_text(&messages).ok_or_else(|| JobError::NoAssistantMessage {
            thread_id: thread_id.clone(),
            empty_thread: messages.is_empty(),
        })
    }

    fn submission_failed(&self, operation: &str, err: ProviderError) -> JobError {
        self.reporter.report(operation, &err);
        JobError::RemoteSubmission(err.to_string())
    }

    fn call_failed(&self, phase: JobPhase, operation: &str, err: ProviderError) -> JobError {
        tracing::warn!(
            operation,
            transient = err.is_retryable(),
            error = %err,
            "Remote call failed; giving up on this job"
        );
        self.reporter.report(operation, &err);
        JobError::RemoteCall {
            phase,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAssistantProvider, MockError, MockOperation};
    use crate::adapters::observability::RecordingErrorReporter;
    use crate::domain::assistant::{MessageContent, MessageRole, RunStatus, ThreadMessage};

    fn request() -> JobRequest {
        JobRequest {
            thread_id: ThreadId::new("T1").unwrap(),
            assistant_id: AssistantId::new("asst_1").unwrap(),
            text: "What is six times seven?".to_string(),
            instructions: None,
        }
    }

    fn poller(
        provider: &MockAssistantProvider,
        reporter: &Arc<RecordingErrorReporter>,
        max_attempts: u32,
    ) -> JobCompletionPoller {
        JobCompletionPoller::new(Arc::new(provider.clone()), reporter.clone()).with_settings(
            PollerSettings {
                max_attempts,
                delay: PollDelay::None,
            },
        )
    }

    #[tokio::test]
    async fn completes_after_two_in_progress_checks() {
        let provider = MockAssistantProvider::new()
            .with_statuses([RunStatus::InProgress, RunStatus::InProgress, RunStatus::Completed])
            .with_assistant_reply(["42"]);
        let reporter = Arc::new(RecordingErrorReporter::new());

        let outcome = poller(&provider, &reporter, DEFAULT_MAX_ATTEMPTS)
            .run(&request())
            .await
            .unwrap();

        assert_eq!(outcome.text, "42");
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.handle.thread_id.as_str(), "T1");
        assert_eq!(provider.status_checks(), 3);
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn times_out_after_exactly_max_attempts() {
        let provider = MockAssistantProvider::new().with_fallback_status(RunStatus::InProgress);
        let reporter = Arc::new(RecordingErrorReporter::new());

        let err = poller(&provider, &reporter, DEFAULT_MAX_ATTEMPTS)
            .run(&request())
            .await
            .unwrap_err();

        assert_eq!(err, JobError::PollTimeout { attempts: 600 });
        assert_eq!(err.status_code(), 408);
        assert_eq!(provider.status_checks(), 600);
    }

    #[tokio::test]
    async fn success_on_last_allowed_check_is_not_a_timeout() {
        let provider = MockAssistantProvider::new()
            .with_statuses([RunStatus::Queued, RunStatus::InProgress, RunStatus::Completed])
            .with_assistant_reply(["done"]);
        let reporter = Arc::new(RecordingErrorReporter::new());

        let outcome = poller(&provider, &reporter, 3).run(&request()).await.unwrap();
        assert_eq!(outcome.attempts, 2);
        assert_eq!(provider.status_checks(), 3);
    }

    #[tokio::test]
    async fn zero_budget_times_out_without_checking() {
        let provider = MockAssistantProvider::new();
        let reporter = Arc::new(RecordingErrorReporter::new());

        let err = poller(&provider, &reporter, 0).run(&request()).await.unwrap_err();
        assert_eq!(err, JobError::PollTimeout { attempts: 0 });
        assert_eq!(provider.status_checks(), 0);
    }

    #[tokio::test]
    async fn terminal_failure_stops_polling_and_is_reported() {
        let provider = MockAssistantProvider::new()
            .with_statuses([RunStatus::InProgress, RunStatus::Failed]);
        let reporter = Arc::new(RecordingErrorReporter::new());

        let err = poller(&provider, &reporter, 10).run(&request()).await.unwrap_err();

        assert!(matches!(
            err,
            JobError::RemoteFailure {
                status: RunStatus::Failed,
                ..
            }
        ));
        assert_eq!(provider.status_checks(), 2);
        assert_eq!(reporter.operations(), vec!["poller.poll".to_string()]);
    }

    #[tokio::test]
    async fn submission_error_skips_polling() {
        let provider = MockAssistantProvider::new().with_error(
            MockOperation::CreateRun,
            MockError::Unavailable {
                message: "overloaded".to_string(),
            },
        );
        let reporter = Arc::new(RecordingErrorReporter::new());

        let err = poller(&provider, &reporter, 10).run(&request()).await.unwrap_err();

        assert!(matches!(err, JobError::RemoteSubmission(_)));
        assert_eq!(err.status_code(), 500);
        assert_eq!(provider.status_checks(), 0);
        assert_eq!(reporter.operations(), vec!["poller.create_run".to_string()]);
    }

    #[tokio::test]
    async fn status_check_error_is_reported_and_typed() {
        let provider = MockAssistantProvider::new().with_error(
            MockOperation::GetRunStatus,
            MockError::Network {
                message: "connection reset".to_string(),
            },
        );
        let reporter = Arc::new(RecordingErrorReporter::new());

        let err = poller(&provider, &reporter, 10).run(&request()).await.unwrap_err();

        assert!(matches!(
            err,
            JobError::RemoteCall {
                phase: JobPhase::Poll,
                ..
            }
        ));
        assert_eq!(reporter.len(), 1);
    }

    #[tokio::test]
    async fn fetch_joins_text_segments_with_newline() {
        let provider = MockAssistantProvider::new().with_assistant_reply(["Hello", "world"]);
        let reporter = Arc::new(RecordingErrorReporter::new());

        let text = poller(&provider, &reporter, 10)
            .fetch_reply(&ThreadId::new("T1").unwrap())
            .await
            .unwrap();
        assert_eq!(text, "Hello\nworld");
    }

    #[tokio::test]
    async fn fetch_without_assistant_message_is_404() {
        let provider = MockAssistantProvider::new().with_messages(vec![ThreadMessage::new(
            "msg_1",
            MessageRole::User,
            vec![MessageContent::text("hi")],
        )]);
        let reporter = Arc::new(RecordingErrorReporter::new());

        let err = poller(&provider, &reporter, 10)
            .fetch_reply(&ThreadId::new("T1").unwrap())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            JobError::NoAssistantMessage {
                thread_id: ThreadId::new("T1").unwrap(),
                empty_thread: false,
            }
        );
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn fetch_from_empty_thread_is_404() {
        let provider = MockAssistantProvider::new();
        let reporter = Arc::new(RecordingErrorReporter::new());

        let err = poller(&provider, &reporter, 10)
            .fetch_reply(&ThreadId::new("T1").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.client_message(), "No messages found in the thread");
    }

    #[tokio::test]
    async fn fixed_delay_sleeps_between_checks() {
        let provider = MockAssistantProvider::new()
            .with_statuses([RunStatus::InProgress, RunStatus::InProgress])
            .with_assistant_reply(["ok"]);
        let reporter = Arc::new(RecordingErrorReporter::new());
        let poller = JobCompletionPoller::new(Arc::new(provider.clone()), reporter).with_settings(
            PollerSettings {
                max_attempts: 10,
                delay: PollDelay::Fixed(Duration::from_millis(10)),
            },
        );

        let started = std::time::Instant::now();
        let outcome = poller.run(&request()).await.unwrap();

        assert_eq!(outcome.attempts, 2);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
