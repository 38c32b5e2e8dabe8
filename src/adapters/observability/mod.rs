//! Observability Adapters.
//!
//! - `TracingErrorReporter` - Logs reported errors through `tracing`
//! - `RecordingErrorReporter` - Keeps reported errors in memory for tests

mod recording_reporter;
mod tracing_reporter;

pub use recording_reporter::{RecordedError, RecordingErrorReporter};
pub use tracing_reporter::{error_chain, TracingErrorReporter};
