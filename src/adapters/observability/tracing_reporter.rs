//! Error reporter backed by `tracing`.

use std::error::Error;

use crate::ports::ErrorReporter;

/// Logs every reported error at `error` level with its source chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

impl TracingErrorReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, operation: &str, error: &(dyn Error + 'static)) {
        tracing::error!(
            operation,
            error = %error,
            chain = %error_chain(error),
            "Reported error"
        );
    }
}

/// Joins an error and its sources with `": "`.
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
