//! `POST /assistant` - create a remote assistant from the configured profile.

use async_trait::async_trait;

use crate::application::ProviderSource;
use crate::domain::dispatch::{CommandError, CommandHandler, HandlerResult, NormalizedRequest};
use crate::ports::AssistantSpec;

pub struct CreateAssistantHandler {
    providers: ProviderSource,
    spec: AssistantSpec,
}

impl CreateAssistantHandler {
    pub fn new(providers: ProviderSource, spec: AssistantSpec) -> Self {
        Self { providers, spec }
    }
}

#[async_trait]
impl CommandHandler for CreateAssistantHandler {
    async fn handle(&self, request: &NormalizedRequest) -> Result<HandlerResult, CommandError> {
        let provider = self.providers.resolve(request)?;

        let assistant = provider
            .create_assistant(&self.spec)
            .await
            .map_err(CommandError::unexpected)?;

        tracing::info!(assistant_id = %assistant.id, model = %assistant.model, "Assistant created");
        HandlerResult::json(&assistant)
    }
}
