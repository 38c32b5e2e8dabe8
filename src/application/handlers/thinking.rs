//! `POST /thinking` - run one assistant turn and return its reply text.
//!
//! Submits the message, records the run against the thread, then polls
//! until the run completes and fetches the newest assistant message.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::application::{JobCompletionPoller, JobRequest, PollerSettings, ProviderSource};
use crate::domain::dispatch::{CommandError, CommandHandler, HandlerResult, NormalizedRequest};
use crate::domain::foundation::{AssistantId, ThreadId};
use crate::ports::{ErrorReporter, ThreadRepository};

/// Body of `POST /thinking`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingRequest {
    pub text: String,
    pub assistant_id: String,
    pub thread_id: String,
}

impl ThinkingRequest {
    fn into_job(self, instructions: Option<String>) -> Result<JobRequest, CommandError> {
        let thread_id =
            ThreadId::new(self.thread_id).map_err(|e| CommandError::bad_request(e.to_string()))?;
        let assistant_id = AssistantId::new(self.assistant_id)
            .map_err(|e| CommandError::bad_request(e.to_string()))?;

        Ok(JobRequest {
            thread_id,
            assistant_id,
            text: self.text,
            instructions,
        })
    }
}

pub struct ThinkingHandler {
    providers: ProviderSource,
    threads: Arc<dyn ThreadRepository>,
    reporter: Arc<dyn ErrorReporter>,
    settings: PollerSettings,
    run_instructions: Option<String>,
}

impl ThinkingHandler {
    pub fn new(
        providers: ProviderSource,
        threads: Arc<dyn ThreadRepository>,
        reporter: Arc<dyn ErrorReporter>,
        settings: PollerSettings,
        run_instructions: Option<String>,
    ) -> Self {
        Self {
            providers,
            threads,
            reporter,
            settings,
            run_instructions,
        }
    }
}

#[async_trait]
impl CommandHandler for ThinkingHandler {
    async fn handle(&self, request: &NormalizedRequest) -> Result<HandlerResult, CommandError> {
        // 1. Credentials first, then the body
        let provider = self.providers.resolve(request)?;
        let job = request
            .json_body::<ThinkingRequest>()?
            .into_job(self.run_instructions.clone())?;

        let poller =
            JobCompletionPoller::new(provider, self.reporter.clone()).with_settings(self.settings);

        // 2. Submit
        let handle = poller.submit(&job).await?;

        // 3. Persist the run before polling
        self.threads
            .append_run_id(&handle.thread_id, &handle.run_id)
            .await
            .map_err(CommandError::unexpected)?;

        // 4. Poll and fetch
        let outcome = poller.complete(handle).await?;

        tracing::info!(
            thread_id = %outcome.handle.thread_id,
            run_id = %outcome.handle.run_id,
            attempts = outcome.attempts,
            "Assistant turn completed"
        );
        Ok(HandlerResult::text(outcome.text))
    }
}
