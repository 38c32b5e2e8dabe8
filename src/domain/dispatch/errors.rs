//! Dispatch error taxonomy.

use thiserror::Error;

use super::HttpMethod;

/// Message returned to clients for every error that is not typed.
pub const GENERIC_ERROR_MESSAGE: &str = "Internal Server Error";

/// Failure produced anywhere on the dispatch path.
///
/// `Http` is the typed exception: its status and message reach the client
/// unchanged. Every other variant maps to a fixed status, and only
/// `RouteNotFound` exposes anything beyond the generic message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The transport request could not be normalized.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// No command is registered for this method and path.
    #[error("no command registered for {method} {path}")]
    RouteNotFound { method: HttpMethod, path: String },

    /// Error carrying an explicit status for direct client propagation.
    #[error("{message} (status {status})")]
    Http { status: u16, message: String },

    /// Anything else; the cause is reported, never sent to the client.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl CommandError {
    /// Creates a typed error with an explicit status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::http(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::http(401, message)
    }

    /// Wraps any unexpected failure.
    pub fn unexpected(cause: impl std::fmt::Display) -> Self {
        Self::Unexpected(cause.to_string())
    }

    /// Status code sent to the client.
    ///
    /// Normalization failures share the 500 of unexpected errors.
    pub fn status_code(&self) -> u16 {
        match self {
            CommandError::MalformedRequest(_) => 500,
            CommandError::RouteNotFound { .. } => 404,
            CommandError::Http { status, .. } => *status,
            CommandError::Unexpected(_) => 500,
        }
    }

    /// Message safe to send to the client.
    pub fn client_message(&self) -> String {
        match self {
            CommandError::Http { message, .. } => message.clone(),
            CommandError::RouteNotFound { .. } => "Not Found".to_string(),
            CommandError::MalformedRequest(_) | CommandError::Unexpected(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// True when the dispatcher must hand the cause to the error reporter.
    ///
    /// Typed errors are reported where they are raised.
    pub fn should_report(&self) -> bool {
        matches!(
            self,
            CommandError::MalformedRequest(_) | CommandError::Unexpected(_)
        )
    }
}
