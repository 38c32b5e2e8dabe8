//! Thread Repository Port - Durable link between threads and their runs.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::{RunId, ThreadId, Timestamp};

/// Stored linkage for one remote thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRecord {
    pub thread_id: ThreadId,
    /// Client-supplied owner reference, if any.
    pub owner: Option<String>,
    /// Runs started against the thread, oldest first.
    pub run_ids: Vec<RunId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ThreadRecord {
    pub fn new(thread_id: ThreadId, owner: Option<String>) -> Self {
        let now = Timestamp::now();
        Self {
            thread_id,
            owner,
            run_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Port for thread/run persistence.
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Records a thread and its owner. Re-recording replaces the owner.
    async fn record_job(
        &self,
        thread_id: &ThreadId,
        owner: Option<&str>,
    ) -> Result<(), RepositoryError>;

    /// Appends a run to a thread, creating an ownerless record if needed.
    async fn append_run_id(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<(), RepositoryError>;

    async fn find(&self, thread_id: &ThreadId) -> Result<Option<ThreadRecord>, RepositoryError>;
}

/// Thread repository errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(String),
}
