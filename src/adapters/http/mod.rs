//! HTTP adapters - transport side of the dispatch layer.
//!
//! - `normalizer` - raw request → `NormalizedRequest`
//! - `responder` - `HandlerResult` / `CommandError` → raw response
//! - `cors` - CORS policy applied to every response
//! - `dispatcher` - the never-failing request boundary
//! - `server` - axum host routing everything into the dispatcher

mod cors;
mod dispatcher;
mod normalizer;
mod responder;
mod server;

pub use cors::{CorsHeaders, CorsPolicy};
pub use dispatcher::{Dispatcher, DEADLINE_MESSAGE, DEFAULT_REQUEST_TIMEOUT};
pub use normalizer::normalize;
pub use responder::{error_response, into_response};
pub use server::{router, HostState, DEFAULT_MAX_BODY_BYTES};
