//! Assistant Provider Port - Interface to a remote assistants API.
//!
//! This port abstracts the remote service that owns assistants, threads and
//! runs. The Job-Completion Poller depends only on this trait, so tests can
//! swap in a scripted provider.
//!
//! # Design
//!
//! - Runs are asynchronous on the remote side; callers poll
//!   [`AssistantProvider::get_run_status`] until a terminal status
//! - Message lists come back newest first
//! - Error types classify failures as retryable or not

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::assistant::{JobHandle, RunStatus, ThreadMessage};
use crate::domain::foundation::{AssistantId, RunId, ThreadId};

/// Port for remote assistant interactions.
#[async_trait]
pub trait AssistantProvider: Send + Sync {
    /// Creates a remote assistant.
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<Assistant, ProviderError>;

    /// Creates an empty remote thread.
    async fn create_thread(&self) -> Result<Thread, ProviderError>;

    /// Appends a user message to a thread.
    async fn submit_message(&self, thread_id: &ThreadId, text: &str) -> Result<(), ProviderError>;

    /// Starts a run of `assistant_id` against `thread_id`.
    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
        instructions: Option<&str>,
    ) -> Result<Run, ProviderError>;

    /// Fetches the current status of a run.
    async fn get_run_status(&self, handle: &JobHandle) -> Result<RunStatus, ProviderError>;

    /// Lists a thread's messages, newest first.
    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>, ProviderError>;

    /// Provider name for logs (e.g., "openai").
    fn provider_name(&self) -> &'static str;
}

/// Parameters for creating an assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantSpec {
    pub name: String,
    pub model: String,
    pub instructions: String,
    /// Tool types, e.g. `"code_interpreter"`.
    pub tools: Vec<String>,
}

/// A remote assistant as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assistant {
    pub id: AssistantId,
    pub name: Option<String>,
    pub model: String,
    pub instructions: Option<String>,
    pub tools: Vec<String>,
    /// Unix seconds.
    pub created_at: i64,
}

/// A remote thread as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    /// Unix seconds.
    pub created_at: i64,
}

/// A newly created run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub thread_id: ThreadId,
    pub assistant_id: AssistantId,
    pub status: RunStatus,
}

impl Run {
    pub fn handle(&self) -> JobHandle {
        JobHandle::new(self.thread_id.clone(), self.id.clone())
    }
}

/// Assistant provider errors.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Referenced thread, run or assistant does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Provider rejected the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl ProviderError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Unavailable { .. }
                | ProviderError::Network(_)
                | ProviderError::Timeout { .. }
        )
    }
}
