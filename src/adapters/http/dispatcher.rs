//! Dispatcher - the outermost request boundary.
//!
//! ```text
//! raw request ─► CORS headers ─► normalize ─► pre-flight? ─► route ─► handler
//!                                                                       │
//! raw response ◄── attach CORS ◄── response normalizer ◄────────────────┘
//! ```
//!
//! `dispatch` never fails: normalization errors, unknown routes, handler
//! errors, panics and deadline overruns all become well-formed responses,
//! and every response carries the CORS headers computed up front.

use futures::FutureExt;
use http::{HeaderMap, Request, Response};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::cors::CorsPolicy;
use super::normalizer::normalize;
use super::responder::{error_response, into_response};
use crate::domain::dispatch::{CommandError, CommandRegistry, HandlerResult, NormalizedRequest};
use crate::ports::ErrorReporter;

/// Message sent when a handler overruns the request deadline.
pub const DEADLINE_MESSAGE: &str = "Request deadline exceeded";

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Routes raw requests through the command registry.
pub struct Dispatcher {
    registry: CommandRegistry,
    cors: CorsPolicy,
    reporter: Arc<dyn ErrorReporter>,
    request_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        registry: CommandRegistry,
        cors: CorsPolicy,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            registry,
            cors,
            reporter,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the per-request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Turns one raw request into one raw response.
    pub async fn dispatch(&self, raw: Request<Vec<u8>>) -> Response<Vec<u8>> {
        let started = Instant::now();
        let cors = self.cors.headers_for(raw.headers());

        let request = match normalize(&raw) {
            Ok(request) => request,
            Err(error) => {
                tracing::warn!(
                    method = %raw.method(),
                    uri = %raw.uri(),
                    error = %error,
                    "Request normalization failed"
                );
                return self.reject(raw.headers(), "dispatch.normalize", error);
            }
        };

        if request.method().is_preflight() {
            tracing::debug!(path = %request.path(), "Answering CORS pre-flight");
            return self.cors.preflight(&cors);
        }

        let (command, outcome) = self.execute(&request).await;
        let mut response = match outcome {
            Ok(result) => into_response(result),
            Err(error) => {
                if error.should_report() {
                    self.reporter.report(command, &error);
                }
                error_response(&error)
            }
        };
        cors.apply(response.headers_mut());

        tracing::info!(
            method = %request.method(),
            path = %request.path(),
            command,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request dispatched"
        );
        response
    }

    /// Error response for a request that never reached the router.
    ///
    /// Used by transport hosts for failures before a full request exists,
    /// such as a body that could not be read.
    pub fn reject(
        &self,
        headers: &HeaderMap,
        operation: &str,
        error: CommandError,
    ) -> Response<Vec<u8>> {
        if error.should_report() {
            self.reporter.report(operation, &error);
        }
        let mut response = error_response(&error);
        self.cors.headers_for(headers).apply(response.headers_mut());
        response
    }

    async fn execute(
        &self,
        request: &NormalizedRequest,
    ) -> (&'static str, Result<HandlerResult, CommandError>) {
        let entry = match self.registry.route_request(request) {
            Ok(entry) => entry,
            Err(error) => return ("dispatch.route", Err(error)),
        };

        let handler = entry.handler().handle(request);
        let guarded = AssertUnwindSafe(handler).catch_unwind();

        let outcome = match tokio::time::timeout(self.request_timeout, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(CommandError::Unexpected(format!(
                "handler panicked: {}",
                panic_message(panic.as_ref())
            ))),
            Err(_) => {
                tracing::warn!(
                    command = entry.name(),
                    timeout_secs = self.request_timeout.as_secs(),
                    "Handler exceeded request deadline"
                );
                Err(CommandError::http(504, DEADLINE_MESSAGE))
            }
        };

        (entry.name(), outcome)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::observability::RecordingErrorReporter;
    use crate::domain::dispatch::{CommandHandler, HttpMethod};
    use async_trait::async_trait;
    use http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE};
    use http::StatusCode;

    struct Reply(Result<HandlerResult, CommandError>);

    #[async_trait]
    impl CommandHandler for Reply {
        async fn handle(&self, _request: &NormalizedRequest) -> Result<HandlerResult, CommandError> {
            self.0.clone()
        }
    }

    struct Panics;

    #[async_trait]
    impl CommandHandler for Panics {
        async fn handle(&self, _request: &NormalizedRequest) -> Result<HandlerResult, CommandError> {
            panic!("boom");
        }
    }

    struct Sleeps;

    #[async_trait]
    impl CommandHandler for Sleeps {
        async fn handle(&self, _request: &NormalizedRequest) -> Result<HandlerResult, CommandError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(HandlerResult::empty())
        }
    }

    fn dispatcher(reporter: Arc<RecordingErrorReporter>) -> Dispatcher {
        let registry = CommandRegistry::builder()
            .register(
                HttpMethod::Get,
                "/ok",
                "ok",
                Arc::new(Reply(Ok(HandlerResult::text("fine")))),
            )
            .register(
                HttpMethod::Get,
                "/typed",
                "typed",
                Arc::new(Reply(Err(CommandError::http(408, "Request timed out")))),
            )
            .register(
                HttpMethod::Get,
                "/broken",
                "broken",
                Arc::new(Reply(Err(CommandError::unexpected("disk on fire")))),
            )
            .register(HttpMethod::Get, "/panic", "panic", Arc::new(Panics))
            .register(HttpMethod::Get, "/slow", "slow", Arc::new(Sleeps))
            .build()
            .unwrap();

        Dispatcher::new(registry, CorsPolicy::new(), reporter)
            .with_request_timeout(Duration::from_millis(50))
    }

    fn get(uri: &str) -> Request<Vec<u8>> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("Origin", "https://app.test")
            .body(Vec::new())
            .unwrap()
    }

    fn message(response: &Response<Vec<u8>>) -> String {
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        body["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn success_carries_cors_headers() {
        let reporter = Arc::new(RecordingErrorReporter::new());
        let response = dispatcher(reporter.clone()).dispatch(get("/ok")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), b"fine");
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.test");
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn unknown_route_is_404_with_cors() {
        let reporter = Arc::new(RecordingErrorReporter::new());
        let response = dispatcher(reporter.clone()).dispatch(get("/missing")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn typed_error_propagates_without_report() {
        let reporter = Arc::new(RecordingErrorReporter::new());
        let response = dispatcher(reporter.clone()).dispatch(get("/typed")).await;

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(message(&response), "Request timed out");
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn unexpected_error_is_reported_and_hidden() {
        let reporter = Arc::new(RecordingErrorReporter::new());
        let response = dispatcher(reporter.clone()).dispatch(get("/broken")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message(&response).contains("disk"));
        assert_eq!(reporter.operations(), vec!["broken".to_string()]);
    }

    #[tokio::test]
    async fn panic_becomes_reported_500() {
        let reporter = Arc::new(RecordingErrorReporter::new());
        let response = dispatcher(reporter.clone()).dispatch(get("/panic")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
        assert_eq!(reporter.len(), 1);
        assert!(reporter.reports()[0].message.contains("boom"));
    }

    #[tokio::test]
    async fn deadline_overrun_is_typed_504() {
        let reporter = Arc::new(RecordingErrorReporter::new());
        let response = dispatcher(reporter.clone()).dispatch(get("/slow")).await;

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(message(&response), DEADLINE_MESSAGE);
        assert!(response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn preflight_bypasses_router() {
        let reporter = Arc::new(RecordingErrorReporter::new());
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/not-registered")
            .header("Origin", "https://app.test")
            .body(Vec::new())
            .unwrap();
        let response = dispatcher(reporter).dispatch(request).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().contains_key(ACCESS_CONTROL_MAX_AGE));
    }

    #[tokio::test]
    async fn normalization_failure_is_reported_500_with_cors() {
        let reporter = Arc::new(RecordingErrorReporter::new());
        let request = Request::builder()
            .method("OPTIONS")
            .uri("*")
            .header("Origin", "https://app.test")
            .body(Vec::new())
            .unwrap();
        let response = dispatcher(reporter.clone()).dispatch(request).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.test");
        assert_eq!(reporter.operations(), vec!["dispatch.normalize".to_string()]);
    }
}
