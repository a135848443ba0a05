use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::models::{
    ContractDraft, DraftPatch, NewAuditEntry, NewContractDraft, NewNotification, QueuedOperation,
};

/// Errors from the hosted backend, classified for retry decisions.
///
/// "Not found" is deliberately distinguishable from transport failure: an
/// update hitting a deleted draft must not be retried, while a connection
/// drop should be.
#[derive(Debug, thiserror::Error)]
pub enum RemoteStoreError {
    /// The referenced record does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Transport-level failure reaching the backend
    #[error("Connection failure: {0}")]
    Connection(String),

    /// The request exceeded its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend reported a server-side error
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend rejected the payload
    #[error("Validation rejected: {0}")]
    Validation(String),

    /// Payload could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RemoteStoreError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Connection drops, timeouts, and server-side errors are transient;
    /// missing records and rejected payloads will fail identically every
    /// time, so retrying them only burns the retry budget.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout(_) | Self::Backend(_)
        )
    }
}

/// The hosted backend all reads and writes pass through.
///
/// Implementations: [`PgRemoteStore`](super::PgRemoteStore) for the real
/// backend, [`InMemoryRemoteStore`](crate::test_helpers::InMemoryRemoteStore)
/// for tests.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a draft, returning it with its server-assigned id
    async fn create_draft(
        &self,
        draft: NewContractDraft,
    ) -> Result<ContractDraft, RemoteStoreError>;

    /// Update an existing draft by id; `NotFound` if it no longer exists
    async fn update_draft(
        &self,
        draft_id: Uuid,
        patch: DraftPatch,
    ) -> Result<ContractDraft, RemoteStoreError>;

    /// Most recently saved draft for a visit, if any
    async fn latest_draft_for_visit(
        &self,
        visit_id: Uuid,
    ) -> Result<Option<ContractDraft>, RemoteStoreError>;

    /// Remove a draft once the visit is finalized; idempotent
    async fn delete_draft(&self, draft_id: Uuid) -> Result<(), RemoteStoreError>;

    /// Append an audit-log entry
    async fn append_audit(&self, entry: NewAuditEntry) -> Result<(), RemoteStoreError>;

    /// Replay a queued operation against the backend
    async fn apply_operation(&self, operation: &QueuedOperation) -> Result<(), RemoteStoreError>;

    /// Create a notification record, returning its id
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<String, RemoteStoreError>;

    /// Assigned region for a sales rep, `None` when unassigned
    async fn rep_region(&self, rep_id: &str) -> Result<Option<String>, RemoteStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability_classification() {
        assert!(RemoteStoreError::Connection("reset".into()).is_retryable());
        assert!(RemoteStoreError::Timeout(Duration::from_secs(15)).is_retryable());
        assert!(RemoteStoreError::Backend("500".into()).is_retryable());

        assert!(!RemoteStoreError::NotFound {
            entity: "contract_draft",
            id: "x".into()
        }
        .is_retryable());
        assert!(!RemoteStoreError::Validation("bad phone".into()).is_retryable());
    }
}
