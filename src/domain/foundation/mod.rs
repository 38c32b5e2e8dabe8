//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps and validation errors that form the
//! vocabulary shared by the dispatch, assistant and account modules.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{AccountId, AssistantId, RunId, ThreadId};
pub use timestamp::Timestamp;
