//! Handler results.
//!
//! Handlers pick the response shape explicitly. The response normalizer maps
//! every variant exhaustively, so there is no runtime type inspection.

use serde::Serialize;
use serde_json::{Number, Value};

use super::CommandError;

/// Fully formed response passed through untouched (apart from CORS headers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Value returned by a command handler.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResult {
    /// Passed through as-is.
    Raw(RawResponse),
    /// 200 with a text body.
    Text(String),
    /// JSON-serialized body; status 200 unless set otherwise.
    Json { status: u16, value: Value },
    /// 200 with the number's decimal representation.
    Number(Number),
    /// 204, no body.
    Empty,
}

impl HandlerResult {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(body.into())
    }

    /// Serializes `value` into a 200 JSON result.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Unexpected` if `value` cannot be serialized.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, CommandError> {
        Self::json_with_status(200, value)
    }

    /// Serializes `value` into a JSON result with an explicit status.
    pub fn json_with_status<T: Serialize>(status: u16, value: &T) -> Result<Self, CommandError> {
        let value = serde_json::to_value(value).map_err(CommandError::unexpected)?;
        Ok(Self::Json { status, value })
    }

    pub fn number(value: impl Into<Number>) -> Self {
        Self::Number(value.into())
    }

    pub fn empty() -> Self {
        Self::Empty
    }

    /// Status the response normalizer will use.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerResult::Raw(raw) => raw.status,
            HandlerResult::Text(_) | HandlerResult::Number(_) => 200,
            HandlerResult::Json { status, .. } => *status,
            HandlerResult::Empty => 204,
        }
    }
}
