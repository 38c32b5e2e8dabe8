//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AssistantProvider` - Remote assistants, threads and runs
//! - `ErrorReporter` - Observability sink for unexpected failures
//! - `AccountStore` - Account lookup, creation and password checks
//! - `ThreadRepository` - Thread ownership and run history

mod account_store;
mod assistant_provider;
mod error_reporter;
mod thread_repository;

pub use account_store::{AccountError, AccountStore};
pub use assistant_provider::{
    Assistant, AssistantProvider, AssistantSpec, ProviderError, Run, Thread,
};
pub use error_reporter::ErrorReporter;
pub use thread_repository::{RepositoryError, ThreadRecord, ThreadRepository};
