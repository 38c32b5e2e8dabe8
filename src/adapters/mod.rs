//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `http` - Request dispatch over axum
//! - `ai` - Assistant providers (OpenAI Assistants API, mock)
//! - `accounts` - In-memory account store with salted password hashing
//! - `storage` - In-memory thread repository
//! - `observability` - Error reporters

pub mod accounts;
pub mod ai;
pub mod http;
pub mod observability;
pub mod storage;

pub use accounts::{InMemoryAccountStore, PasswordHasher};
pub use ai::{MockAssistantProvider, OpenAIAssistantsConfig, OpenAIAssistantsProvider};
pub use self::http::{router, CorsPolicy, Dispatcher};
pub use observability::{RecordingErrorReporter, TracingErrorReporter};
pub use storage::InMemoryThreadRepository;
