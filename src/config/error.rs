//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Request timeout must be between 1 and 900 seconds")]
    InvalidTimeout,

    #[error("Request body limit must be positive")]
    InvalidBodyLimit,

    #[error("Provider base URL must be an http(s) URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Provider timeout must be positive")]
    InvalidProviderTimeout,

    #[error("Assistant {0} must not be empty")]
    EmptyAssistantField(&'static str),

    #[error("Poller max_attempts must be between 1 and {max}")]
    InvalidPollBudget { max: u32 },

    #[error("Poller initial delay must be positive and not exceed the max delay")]
    InvalidPollDelay,

    #[error(
        "Poller can sleep {sleep_ms}ms before timing out, past the {deadline_secs}s request deadline"
    )]
    PollExceedsDeadline { sleep_ms: u128, deadline_secs: u64 },
}
