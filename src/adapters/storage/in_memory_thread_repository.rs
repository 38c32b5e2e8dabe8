//! In-Memory Thread Repository Adapter
//!
//! Stores thread ownership and run history in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{RunId, ThreadId, Timestamp};
use crate::ports::{RepositoryError, ThreadRecord, ThreadRepository};

/// In-memory storage for thread records
#[derive(Debug, Clone, Default)]
pub struct InMemoryThreadRepository {
    records: Arc<RwLock<HashMap<ThreadId, ThreadRecord>>>,
}

impl InMemoryThreadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored threads
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl ThreadRepository for InMemoryThreadRepository {
    async fn record_job(
        &self,
        thread_id: &ThreadId,
        owner: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        match records.get_mut(thread_id) {
            Some(record) => {
                record.owner = owner.map(str::to_string);
                record.updated_at = Timestamp::now();
            }
            None => {
                records.insert(
                    thread_id.clone(),
                    ThreadRecord::new(thread_id.clone(), owner.map(str::to_string)),
                );
            }
        }
        Ok(())
    }

    async fn append_run_id(&self, thread_id: &ThreadId, run_id: &RunId) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(thread_id.clone())
            .or_insert_with(|| ThreadRecord::new(thread_id.clone(), None));
        record.run_ids.push(run_id.clone());
        record.updated_at = Timestamp::now();
        Ok(())
    }

    async fn find(&self, thread_id: &ThreadId) -> Result<Option<ThreadRecord>, RepositoryError> {
        Ok(self.records.read().await.get(thread_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread() -> ThreadId {
        ThreadId::new("thread_1").unwrap()
    }

    #[tokio::test]
    async fn record_job_stores_owner() {
        let repo = InMemoryThreadRepository::new();
        repo.record_job(&thread(), Some("user-1")).await.unwrap();

        let record = repo.find(&thread()).await.unwrap().unwrap();
        assert_eq!(record.owner.as_deref(), Some("user-1"));
        assert!(record.run_ids.is_empty());
    }

    #[tokio::test]
    async fn append_keeps_run_order() {
        let repo = InMemoryThreadRepository::new();
        repo.record_job(&thread(), Some("user-1")).await.unwrap();
        repo.append_run_id(&thread(), &RunId::new("run_1").unwrap())
            .await
            .unwrap();
        repo.append_run_id(&thread(), &RunId::new("run_2").unwrap())
            .await
            .unwrap();

        let record = repo.find(&thread()).await.unwrap().unwrap();
        let ids: Vec<&str> = record.run_ids.iter().map(RunId::as_str).collect();
        assert_eq!(ids, vec!["run_1", "run_2"]);
        assert!(!record.updated_at.is_after(&Timestamp::now()));
        assert!(!record.created_at.is_after(&record.updated_at));
    }

    #[tokio::test]
    async fn append_to_unknown_thread_creates_ownerless_record() {
        let repo = InMemoryThreadRepository::new();
        repo.append_run_id(&thread(), &RunId::new("run_1").unwrap())
            .await
            .unwrap();

        let record = repo.find(&thread()).await.unwrap().unwrap();
        assert_eq!(record.owner, None);
        assert_eq!(record.run_ids.len(), 1);
    }

    #[tokio::test]
    async fn re_recording_keeps_runs() {
        let repo = InMemoryThreadRepository::new();
        repo.append_run_id(&thread(), &RunId::new("run_1").unwrap())
            .await
            .unwrap();
        repo.record_job(&thread(), Some("user-2")).await.unwrap();

        let record = repo.find(&thread()).await.unwrap().unwrap();
        assert_eq!(record.owner.as_deref(), Some("user-2"));
        assert_eq!(record.run_ids.len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let repo = InMemoryThreadRepository::new();
        repo.record_job(&thread(), None).await.unwrap();
        assert_eq!(repo.len().await, 1);
        repo.clear().await;
        assert!(repo.is_empty().await);
    }
}
