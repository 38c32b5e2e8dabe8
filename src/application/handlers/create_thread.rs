//! `POST /thread` - create an empty remote thread.
//!
//! When the body names a `userId`, the thread is recorded against that owner
//! before the response is sent.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::application::ProviderSource;
use crate::domain::dispatch::{CommandError, CommandHandler, HandlerResult, NormalizedRequest};
use crate::ports::ThreadRepository;

/// Optional body of `POST /thread`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateThreadRequest {
    pub user_id: Option<String>,
}

impl CreateThreadRequest {
    /// Reads the owner from the body; anything unusable means no owner.
    fn from_request(request: &NormalizedRequest) -> Self {
        match request.body() {
            Some(value @ Value::Object(_)) => {
                serde_json::from_value(value.clone()).unwrap_or_default()
            }
            _ => Self::default(),
        }
    }

    fn owner(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
    }
}

pub struct CreateThreadHandler {
    providers: ProviderSource,
    threads: Arc<dyn ThreadRepository>,
}

impl CreateThreadHandler {
    pub fn new(providers: ProviderSource, threads: Arc<dyn ThreadRepository>) -> Self {
        Self { providers, threads }
    }
}

#[async_trait]
impl CommandHandler for CreateThreadHandler {
    async fn handle(&self, request: &NormalizedRequest) -> Result<HandlerResult, CommandError> {
        let provider = self.providers.resolve(request)?;
        let body = CreateThreadRequest::from_request(request);

        let thread = provider
            .create_thread()
            .await
            .map_err(CommandError::unexpected)?;

        if let Some(owner) = body.owner() {
            self.threads
                .record_job(&thread.id, Some(owner))
                .await
                .map_err(CommandError::unexpected)?;
        }

        tracing::info!(thread_id = %thread.id, owned = body.owner().is_some(), "Thread created");
        HandlerResult::json(&thread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAssistantProvider;
    use crate::adapters::storage::InMemoryThreadRepository;
    use crate::domain::dispatch::HttpMethod;
    use crate::domain::foundation::ThreadId;
    use serde_json::json;

    fn handler(threads: &Arc<InMemoryThreadRepository>) -> CreateThreadHandler {
        CreateThreadHandler::new(
            ProviderSource::shared(Arc::new(MockAssistantProvider::new())),
            threads.clone(),
        )
    }

    fn thread_id(result: &HandlerResult) -> ThreadId {
        match result {
            HandlerResult::Json { value, .. } => {
                ThreadId::new(value["id"].as_str().unwrap()).unwrap()
            }
            other => panic!("expected json, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn records_owner_when_user_id_given() {
        let threads = Arc::new(InMemoryThreadRepository::new());
        let request = NormalizedRequest::builder(HttpMethod::Post, "/thread")
            .json(&json!({"userId": "user-7"}))
            .build()
            .unwrap();

        let result = handler(&threads).handle(&request).await.unwrap();

        let record = threads.find(&thread_id(&result)).await.unwrap().unwrap();
        assert_eq!(record.owner.as_deref(), Some("user-7"));
        assert!(record.run_ids.is_empty());
    }

    #[tokio::test]
    async fn anonymous_thread_is_not_recorded() {
        let threads = Arc::new(InMemoryThreadRepository::new());
        let request = NormalizedRequest::builder(HttpMethod::Post, "/thread")
            .build()
            .unwrap();

        let result = handler(&threads).handle(&request).await.unwrap();

        assert!(threads.find(&thread_id(&result)).await.unwrap().is_none());
        assert_eq!(threads.len().await, 0);
    }

    #[test]
    fn blank_user_id_means_no_owner() {
        let body = CreateThreadRequest {
            user_id: Some("  ".to_string()),
        };
        assert_eq!(body.owner(), None);
    }
}
