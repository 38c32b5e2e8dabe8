//! Dispatch vocabulary - the uniform request, result and routing types.
//!
//! Transport adapters turn raw HTTP traffic into [`NormalizedRequest`]s,
//! look the matching [`CommandEntry`] up in an immutable
//! [`CommandRegistry`], and turn the handler's [`HandlerResult`] or
//! [`CommandError`] back into a transport response.
//!
//! ```text
//! raw request ─► NormalizedRequest ─► CommandRegistry::route ─► CommandHandler
//!                                                                   │
//! raw response ◄──────────── HandlerResult | CommandError ◄─────────┘
//! ```

mod errors;
mod registry;
mod request;
mod result;

pub use errors::{CommandError, GENERIC_ERROR_MESSAGE};
pub use registry::{
    CommandEntry, CommandHandler, CommandRegistry, CommandRegistryBuilder, RegistryError,
    RouteKey,
};
pub use request::{
    HttpMethod, NormalizedRequest, NormalizedRequestBuilder, QueryParams, RequestHeaders,
};
pub use result::{HandlerResult, RawResponse};
