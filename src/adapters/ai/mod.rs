//! Assistant Provider Adapters.
//!
//! Implementations of the AssistantProvider port.
//!
//! ## Available Adapters
//!
//! - `MockAssistantProvider` - Scriptable provider for tests
//! - `OpenAIAssistantsProvider` - OpenAI Assistants API (v2)

mod mock_provider;
mod openai_assistants;

pub use mock_provider::{MockAssistantProvider, MockCall, MockError, MockOperation};
pub use openai_assistants::{OpenAIAssistantsConfig, OpenAIAssistantsProvider};
