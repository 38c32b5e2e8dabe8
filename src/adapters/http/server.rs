//! axum host for the [`Dispatcher`].
//!
//! Every path and method lands in a single fallback handler; routing is the
//! dispatcher's job, not axum's.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::response::Response;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::dispatcher::Dispatcher;
use crate::domain::dispatch::CommandError;

/// Default cap on buffered request payloads.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state of the host.
#[derive(Clone)]
pub struct HostState {
    dispatcher: Arc<Dispatcher>,
    max_body_bytes: usize,
}

impl HostState {
    pub fn new(dispatcher: Arc<Dispatcher>, max_body_bytes: usize) -> Self {
        Self {
            dispatcher,
            max_body_bytes,
        }
    }
}

/// Builds the application router.
pub fn router(dispatcher: Arc<Dispatcher>, max_body_bytes: usize) -> Router {
    Router::new()
        .fallback(dispatch_request)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(HostState::new(dispatcher, max_body_bytes))
}

async fn dispatch_request(State(state): State<HostState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let payload = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            let error = CommandError::MalformedRequest(format!("unreadable body: {}", e));
            return state
                .dispatcher
                .reject(&parts.headers, "dispatch.read_body", error)
                .map(Body::from);
        }
    };

    let raw = http::Request::from_parts(parts, payload);
    state.dispatcher.dispatch(raw).await.map(Body::from)
}
