//! Mock Assistant Provider for testing.
//!
//! Provides a scripted implementation of the AssistantProvider port,
//! allowing tests to run without calling a real assistants API.
//!
//! # Features
//!
//! - Scripted run statuses, consumed one per status check
//! - Fixed message list returned by every fetch
//! - Error injection per operation
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAssistantProvider::new()
//!     .with_statuses([RunStatus::InProgress, RunStatus::InProgress, RunStatus::Completed])
//!     .with_assistant_reply(["42"]);
//!
//! let outcome = poller.run(&request).await?;
//! assert_eq!(outcome.text, "42");
//! assert_eq!(provider.status_checks(), 3);
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::assistant::{JobHandle, MessageContent, MessageRole, RunStatus, ThreadMessage};
use crate::domain::foundation::{AssistantId, RunId, ThreadId};
use crate::ports::{Assistant, AssistantProvider, AssistantSpec, ProviderError, Run, Thread};

/// Provider operation, used to target injected errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    CreateAssistant,
    CreateThread,
    SubmitMessage,
    CreateRun,
    GetRunStatus,
    ListMessages,
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate a missing thread or run.
    NotFound { resource: String },
    /// Simulate network error.
    Network { message: String },
}

impl From<MockError> for ProviderError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => {
                ProviderError::rate_limited(retry_after_secs)
            }
            MockError::Unavailable { message } => ProviderError::unavailable(message),
            MockError::AuthenticationFailed => ProviderError::AuthenticationFailed,
            MockError::NotFound { resource } => ProviderError::NotFound(resource),
            MockError::Network { message } => ProviderError::network(message),
        }
    }
}

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    CreateAssistant(AssistantSpec),
    CreateThread,
    SubmitMessage {
        thread_id: ThreadId,
        text: String,
    },
    CreateRun {
        thread_id: ThreadId,
        assistant_id: AssistantId,
        instructions: Option<String>,
    },
    GetRunStatus(JobHandle),
    ListMessages(ThreadId),
}

/// Mock assistant provider for testing.
///
/// Clones share the same script and call log.
#[derive(Debug, Clone)]
pub struct MockAssistantProvider {
    /// Statuses returned by successive status checks.
    statuses: Arc<Mutex<VecDeque<RunStatus>>>,
    /// Returned once the script runs out.
    fallback_status: RunStatus,
    /// Returned by every message fetch, newest first.
    messages: Arc<Mutex<Vec<ThreadMessage>>>,
    /// One-shot errors per operation.
    errors: Arc<Mutex<HashMap<MockOperation, VecDeque<MockError>>>>,
    /// Simulated latency per call.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<MockCall>>>,
    sequence: Arc<AtomicU64>,
}

impl Default for MockAssistantProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Poisoning only happens after a panic elsewhere in a test; keep going.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockAssistantProvider {
    /// Creates a provider whose runs complete on the first check.
    pub fn new() -> Self {
        Self {
            statuses: Arc::new(Mutex::new(VecDeque::new())),
            fallback_status: RunStatus::Completed,
            messages: Arc::new(Mutex::new(Vec::new())),
            errors: Arc::new(Mutex::new(HashMap::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Queues statuses for successive status checks.
    pub fn with_statuses(self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        lock(&self.statuses).extend(statuses);
        self
    }

    /// Status returned once the queued statuses are used up.
    pub fn with_fallback_status(mut self, status: RunStatus) -> Self {
        self.fallback_status = status;
        self
    }

    /// Sets the message list (newest first).
    pub fn with_messages(self, messages: Vec<ThreadMessage>) -> Self {
        *lock(&self.messages) = messages;
        self
    }

    /// Sets a single assistant message made of the given text segments.
    pub fn with_assistant_reply<I, S>(self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let content = segments.into_iter().map(MessageContent::text).collect();
        self.with_messages(vec![ThreadMessage::new(
            "msg_mock_reply",
            MessageRole::Assistant,
            content,
        )])
    }

    /// Fails the next call to `operation` with `error`.
    pub fn with_error(self, operation: MockOperation, error: MockError) -> Self {
        lock(&self.errors)
            .entry(operation)
            .or_default()
            .push_back(error);
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Number of status checks performed.
    pub fn status_checks(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| matches!(call, MockCall::GetRunStatus(_)))
            .count()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    async fn record(&self, operation: MockOperation, call: MockCall) -> Result<(), ProviderError> {
        lock(&self.calls).push(call);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let injected = lock(&self.errors)
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        match injected {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}_mock_{}", prefix, self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn mock_id<T, E: std::fmt::Display>(
        &self,
        prefix: &str,
        make: impl FnOnce(String) -> Result<T, E>,
    ) -> Result<T, ProviderError> {
        make(self.next_id(prefix)).map_err(|e| ProviderError::parse(e.to_string()))
    }
}

#[async_trait]
impl AssistantProvider for MockAssistantProvider {
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant, ProviderError> {
        self.record(
            MockOperation::CreateAssistant,
            MockCall::CreateAssistant(spec.clone()),
        )
        .await?;

        Ok(Assistant {
            id: self.mock_id("asst", AssistantId::new)?,
            name: Some(spec.name.clone()),
            model: spec.model.clone(),
            instructions: Some(spec.instructions.clone()),
            tools: spec.tools.clone(),
            created_at: 0,
        })
    }

    async fn create_thread(&self) -> Result<Thread, ProviderError> {
        self.record(MockOperation::CreateThread, MockCall::CreateThread)
            .await?;

        Ok(Thread {
            id: self.mock_id("thread", ThreadId::new)?,
            created_at: 0,
        })
    }

    async fn submit_message(&self, thread_id: &ThreadId, text: &str) -> Result<(), ProviderError> {
        self.record(
            MockOperation::SubmitMessage,
            MockCall::SubmitMessage {
                thread_id: thread_id.clone(),
                text: text.to_string(),
            },
        )
        .await
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
        instructions: Option<&str>,
    ) -> Result<Run, ProviderError> {
        self.record(
            MockOperation::CreateRun,
            MockCall::CreateRun {
                thread_id: thread_id.clone(),
                assistant_id: assistant_id.clone(),
                instructions: instructions.map(str::to_string),
            },
        )
        .await?;

        Ok(Run {
            id: self.mock_id("run", RunId::new)?,
            thread_id: thread_id.clone(),
            assistant_id: assistant_id.clone(),
            status: RunStatus::Queued,
        })
    }

    async fn get_run_status(&self, handle: &JobHandle) -> Result<RunStatus, ProviderError> {
        self.record(
            MockOperation::GetRunStatus,
            MockCall::GetRunStatus(handle.clone()),
        )
        .await?;

        Ok(lock(&self.statuses)
            .pop_front()
            .unwrap_or(self.fallback_status))
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>, ProviderError> {
        self.record(
            MockOperation::ListMessages,
            MockCall::ListMessages(thread_id.clone()),
        )
        .await?;

        Ok(lock(&self.messages).clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
