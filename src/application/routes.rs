//! Static route table.

use std::sync::Arc;

use super::handlers::{
    CreateAssistantHandler, CreateThreadHandler, LoginHandler, PingHandler, RegisterHandler,
    ThinkingHandler,
};
use super::{PollerSettings, ProviderSource};
use crate::domain::dispatch::{CommandRegistry, HttpMethod, RegistryError};
use crate::ports::{AccountStore, AssistantSpec, ErrorReporter, ThreadRepository};

/// Collaborators shared by the command handlers.
#[derive(Clone)]
pub struct GatewayServices {
    pub providers: ProviderSource,
    pub accounts: Arc<dyn AccountStore>,
    pub threads: Arc<dyn ThreadRepository>,
    pub reporter: Arc<dyn ErrorReporter>,
    /// Profile used by `POST /assistant`.
    pub assistant: AssistantSpec,
    /// Instructions attached to every run started by `POST /thinking`.
    pub run_instructions: Option<String>,
    pub poller: PollerSettings,
}

/// Builds the registry for every endpoint.
pub fn build_registry(services: GatewayServices) -> Result<CommandRegistry, RegistryError> {
    CommandRegistry::builder()
        .register(HttpMethod::Get, "/ping", "ping", Arc::new(PingHandler))
        .register(
            HttpMethod::Post,
            "/register",
            "register",
            Arc::new(RegisterHandler::new(
                services.accounts.clone(),
                services.reporter.clone(),
            )),
        )
        .register(
            HttpMethod::Post,
            "/login",
            "login",
            Arc::new(LoginHandler::new(
                services.accounts.clone(),
                services.reporter.clone(),
            )),
        )
        .register(
            HttpMethod::Post,
            "/assistant",
            "create_assistant",
            Arc::new(CreateAssistantHandler::new(
                services.providers.clone(),
                services.assistant.clone(),
            )),
        )
        .register(
            HttpMethod::Post,
            "/thread",
            "create_thread",
            Arc::new(CreateThreadHandler::new(
                services.providers.clone(),
                services.threads.clone(),
            )),
        )
        .register(
            HttpMethod::Post,
            "/thinking",
            "thinking",
            Arc::new(ThinkingHandler::new(
                services.providers,
                services.threads,
                services.reporter,
                services.poller,
                services.run_instructions,
            )),
        )
        .build()
}
