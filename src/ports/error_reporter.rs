//! Error Reporter Port - Observability sink for unexpected failures.
//!
//! Reporting is fire-and-forget: implementations must not fail and must
//! return promptly.

use std::error::Error;

/// Port for forwarding errors to an observability backend.
pub trait ErrorReporter: Send + Sync {
    /// Reports `error` raised while performing `operation`.
    fn report(&self, operation: &str, error: &(dyn Error + 'static));
}
