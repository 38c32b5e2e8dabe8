//! Assistant module - remote jobs (runs) executing against threads.
//!
//! A job moves through the provider's opaque status enum until it reaches a
//! terminal value. [`PollState`] tracks the local side of that wait and
//! [`PollDelay`] decides how long to pause between status checks.

mod errors;
mod job;
mod message;
mod run_status;

pub use errors::{JobError, JobPhase};
pub use job::{JobHandle, PollDelay, PollState, PollStep, DEFAULT_MAX_ATTEMPTS};
pub use message::{latest_assistant_text, MessageContent, MessageRole, ThreadMessage};
pub use run_status::RunStatus;
