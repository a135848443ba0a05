//! Durable local mirror of the offline queue.
//!
//! The store interface is a small key-value contract (`put`, `get_all`,
//! `clear`), and `get_all` must preserve insertion order so rehydration
//! after a process restart drains in the original order. The queue mirrors
//! itself by clearing and rewriting the whole collection on every mutation;
//! correct for a single-session field app, not for concurrent processes.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::models::QueuedOperation;

#[derive(Debug, thiserror::Error)]
pub enum DurableStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Local durable key-value store backing the offline queue
#[async_trait]
pub trait DurableQueueStore: Send + Sync {
    /// Insert or replace an operation by id
    async fn put(&self, operation: &QueuedOperation) -> Result<(), DurableStoreError>;

    /// All stored operations, in insertion order
    async fn get_all(&self) -> Result<Vec<QueuedOperation>, DurableStoreError>;

    /// Remove every stored operation
    async fn clear(&self) -> Result<(), DurableStoreError>;
}

/// Queue store persisting operations as a single JSON array on disk
pub struct JsonFileQueueStore {
    path: PathBuf,
}

impl JsonFileQueueStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn read_operations(&self) -> Result<Vec<QueuedOperation>, DurableStoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_operations(
        &self,
        operations: &[QueuedOperation],
    ) -> Result<(), DurableStoreError> {
        let bytes = serde_json::to_vec_pretty(operations)?;
        fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl DurableQueueStore for JsonFileQueueStore {
    async fn put(&self, operation: &QueuedOperation) -> Result<(), DurableStoreError> {
        let mut operations = self.read_operations().await?;
        match operations.iter_mut().find(|op| op.id == operation.id) {
            Some(existing) => *existing = operation.clone(),
            None => operations.push(operation.clone()),
        }
        self.write_operations(&operations).await
    }

    async fn get_all(&self) -> Result<Vec<QueuedOperation>, DurableStoreError> {
        self.read_operations().await
    }

    async fn clear(&self) -> Result<(), DurableStoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory queue store for tests and ephemeral sessions
#[derive(Default)]
pub struct InMemoryQueueStore {
    operations: Mutex<Vec<QueuedOperation>>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DurableQueueStore for InMemoryQueueStore {
    async fn put(&self, operation: &QueuedOperation) -> Result<(), DurableStoreError> {
        let mut operations = self.operations.lock();
        match operations.iter_mut().find(|op| op.id == operation.id) {
            Some(existing) => *existing = operation.clone(),
            None => operations.push(operation.clone()),
        }
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<QueuedOperation>, DurableStoreError> {
        Ok(self.operations.lock().clone())
    }

    async fn clear(&self) -> Result<(), DurableStoreError> {
        self.operations.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OperationType;
    use serde_json::json;

    #[tokio::test]
    async fn test_file_store_round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileQueueStore::new(dir.path().join("queue.json"));

        let first = QueuedOperation::new(OperationType::SaveDraft, json!({"n": 1}));
        let second = QueuedOperation::new(OperationType::AppendAudit, json!({"n": 2}));
        store.put(&first).await.unwrap();
        store.put(&second).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
    }

    #[tokio::test]
    async fn test_file_store_put_replaces_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileQueueStore::new(dir.path().join("queue.json"));

        let mut op = QueuedOperation::new(OperationType::SaveDraft, json!({"n": 1}));
        store.put(&op).await.unwrap();
        op.retry_count = 2;
        store.put(&op).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].retry_count, 2);
    }

    #[tokio::test]
    async fn test_file_store_clear_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileQueueStore::new(dir.path().join("queue.json"));

        assert!(store.get_all().await.unwrap().is_empty());
        store.clear().await.unwrap();

        let op = QueuedOperation::new(OperationType::DeleteDraft, json!({}));
        store.put(&op).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
