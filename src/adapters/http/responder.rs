//! Response normalizer: [`HandlerResult`] / [`CommandError`] → HTTP response.

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};
use serde_json::json;

use crate::domain::dispatch::{CommandError, HandlerResult};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Maps a successful handler result.
pub fn into_response(result: HandlerResult) -> Response<Vec<u8>> {
    let status = result.status_code();

    match result {
        HandlerResult::Raw(raw) => {
            let mut response = build(status, raw.body, None);
            for (name, value) in raw.headers {
                match (
                    HeaderName::from_bytes(name.as_bytes()),
                    HeaderValue::from_str(&value),
                ) {
                    (Ok(name), Ok(value)) => {
                        response.headers_mut().append(name, value);
                    }
                    _ => tracing::warn!(header = %name, "Dropping invalid raw response header"),
                }
            }
            response
        }
        HandlerResult::Text(body) => build(status, body.into_bytes(), Some(TEXT_PLAIN)),
        HandlerResult::Json { value, .. } => {
            build(status, value.to_string().into_bytes(), Some(APPLICATION_JSON))
        }
        HandlerResult::Number(number) => {
            build(status, number.to_string().into_bytes(), Some(TEXT_PLAIN))
        }
        HandlerResult::Empty => build(status, Vec::new(), None),
    }
}

/// Maps an error to `{"message": ...}` with its status.
pub fn error_response(error: &CommandError) -> Response<Vec<u8>> {
    let body = json!({ "message": error.client_message() });
    build(
        error.status_code(),
        body.to_string().into_bytes(),
        Some(APPLICATION_JSON),
    )
}

fn build(status: u16, body: Vec<u8>, content_type: Option<&'static str>) -> Response<Vec<u8>> {
    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::from_u16(status).unwrap_or_else(|_| {
        tracing::warn!(status, "Invalid status code, sending 500");
        StatusCode::INTERNAL_SERVER_ERROR
    });
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}
