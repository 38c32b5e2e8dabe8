//! assistant-gateway server
//!
//! Loads configuration from the environment, wires the adapters into the
//! command registry and serves the dispatcher over axum.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use assistant_gateway::adapters::ai::{OpenAIAssistantsConfig, OpenAIAssistantsProvider};
use assistant_gateway::adapters::http::{router, Dispatcher};
use assistant_gateway::adapters::{
    InMemoryAccountStore, InMemoryThreadRepository, TracingErrorReporter,
};
use assistant_gateway::application::{build_registry, GatewayServices, ProviderSource};
use assistant_gateway::config::{AiConfig, AppConfig, LogFormat, ServerConfig};
use assistant_gateway::ports::{AssistantProvider, ErrorReporter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.server);
    config.validate().context("Invalid configuration")?;

    let addr = config.server.socket_addr()?;
    let reporter: Arc<dyn ErrorReporter> = Arc::new(TracingErrorReporter::new());
    let services = build_services(&config, reporter.clone())?;
    let registry = build_registry(services).context("Failed to build route table")?;

    tracing::info!(
        routes = ?registry.routes().map(ToString::to_string).collect::<Vec<_>>(),
        "Registered commands"
    );

    let dispatcher = Dispatcher::new(registry, config.server.cors_policy(), reporter)
        .with_request_timeout(config.server.request_timeout());
    let app = router(Arc::new(dispatcher), config.server.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        shared_api_key = config.ai.has_openai(),
        "assistant-gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("assistant-gateway stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    match server.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

fn build_services(config: &AppConfig, reporter: Arc<dyn ErrorReporter>) -> Result<GatewayServices> {
    Ok(GatewayServices {
        providers: provider_source(&config.ai)?,
        accounts: Arc::new(InMemoryAccountStore::new()),
        threads: Arc::new(InMemoryThreadRepository::new()),
        reporter,
        assistant: config.ai.assistant_spec(),
        run_instructions: config.ai.run_instructions(),
        poller: config.poller.settings(),
    })
}

fn provider_source(ai: &AiConfig) -> Result<ProviderSource> {
    match ai.openai_api_key.as_ref().filter(|_| ai.has_openai()) {
        Some(key) => {
            let provider = OpenAIAssistantsProvider::new(ai.provider_config(key.clone()))
                .context("Failed to build assistant provider")?;
            Ok(ProviderSource::shared(Arc::new(provider)))
        }
        None => {
            tracing::info!("No server API key configured; expecting bearer keys per request");
            let base_url = ai.base_url.clone();
            let timeout = ai.timeout();

            Ok(ProviderSource::per_request(move |key| {
                let config = OpenAIAssistantsConfig::new(key)
                    .with_base_url(base_url.clone())
                    .with_timeout(timeout);
                let provider: Arc<dyn AssistantProvider> =
                    Arc::new(OpenAIAssistantsProvider::new(config)?);
                Ok(provider)
            }))
        }
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                tracing::warn!("Signal handlers unavailable, falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Shutdown signal received");
}
