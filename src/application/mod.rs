//! Application layer - Command handlers and the Job-Completion Poller.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Handlers are registered once in a static route table; the poller is
//! built per request around the resolved provider.

mod credentials;
pub mod handlers;
mod poller;
mod routes;

pub use credentials::{ProviderFactory, ProviderSource};
pub use poller::{JobCompletionPoller, JobOutcome, JobRequest, PollerSettings};
pub use routes::{build_registry, GatewayServices};
