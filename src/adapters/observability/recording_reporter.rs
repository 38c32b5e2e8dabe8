//! In-memory error reporter for tests.

use std::error::Error;
use std::sync::{Mutex, MutexGuard};

use super::error_chain;
use crate::ports::ErrorReporter;

/// One captured report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedError {
    pub operation: String,
    pub message: String,
}

/// Captures reports so tests can assert on them.
#[derive(Debug, Default)]
pub struct RecordingErrorReporter {
    reports: Mutex<Vec<RecordedError>>,
}

impl RecordingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<RecordedError>> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn reports(&self) -> Vec<RecordedError> {
        self.guard().clone()
    }

    /// Operation labels in report order.
    pub fn operations(&self) -> Vec<String> {
        self.guard().iter().map(|r| r.operation.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

impl ErrorReporter for RecordingErrorReporter {
    fn report(&self, operation: &str, error: &(dyn Error + 'static)) {
        self.guard().push(RecordedError {
            operation: operation.to_string(),
            message: error_chain(error),
        });
    }
}
