//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ASSISTANT_GATEWAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use assistant_gateway::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod ai;
mod error;
mod poller;
mod server;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use poller::{DelayKind, PollerConfig, MAX_POLL_ATTEMPTS};
pub use server::{Environment, LogFormat, ServerConfig, MAX_REQUEST_TIMEOUT_SECS};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// development server that expects per-request API keys.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, logging, CORS, limits)
    #[serde(default)]
    pub server: ServerConfig,

    /// Assistant provider configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Job-completion poller configuration
    #[serde(default)]
    pub poller: PollerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ASSISTANT_GATEWAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ASSISTANT_GATEWAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ASSISTANT_GATEWAY__AI__OPENAI_API_KEY=...` -> `ai.openai_api_key = ...`
    /// - `ASSISTANT_GATEWAY__POLLER__DELAY=fixed` -> `poller.delay = fixed`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ASSISTANT_GATEWAY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.poller.validate()?;

        // A poll must reach its own timeout before the request deadline
        let sleep = self.poller.worst_case_sleep();
        let deadline = self.server.request_timeout();
        if sleep >= deadline {
            return Err(ValidationError::PollExceedsDeadline {
                sleep_ms: sleep.as_millis(),
                deadline_secs: deadline.as_secs(),
            });
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
