//! Command handlers - one per endpoint.
//!
//! Every handler implements [`CommandHandler`] and is registered in the
//! static route table built by [`crate::application::build_registry`].
//!
//! [`CommandHandler`]: crate::domain::dispatch::CommandHandler

mod account_reply;
mod create_assistant;
mod create_thread;
mod login;
mod ping;
mod register;
mod thinking;

pub use account_reply::{AccountReply, ReplyStatus};
pub use create_assistant::CreateAssistantHandler;
pub use create_thread::{CreateThreadHandler, CreateThreadRequest};
pub use login::LoginHandler;
pub use ping::PingHandler;
pub use register::RegisterHandler;
pub use thinking::{ThinkingHandler, ThinkingRequest};
