//! # Postgres Remote Store
//!
//! [`RemoteStore`] implementation over the hosted relational backend using
//! runtime-checked sqlx queries. The schema itself belongs to the backend;
//! this module only depends on the record collections the core touches
//! (contract drafts, finalized visits, audit log, notifications, reps).

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::remote::{RemoteStore, RemoteStoreError};
use crate::models::{
    ContractDraft, DraftPatch, FinalizedVisit, NewAuditEntry, NewContractDraft, NewNotification,
    OperationType, QueuedOperation,
};

const DRAFT_COLUMNS: &str = "id, visit_id, customer_id, sales_rep_id, contract_accepted, \
     signature_ref, sms_phone, sms_sent, otp_verified, notes, completion_pct, current_stage, \
     last_saved_at, metadata";

impl From<sqlx::Error> for RemoteStoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(e) => RemoteStoreError::Connection(e.to_string()),
            sqlx::Error::PoolTimedOut => {
                RemoteStoreError::Connection("connection pool timed out".to_string())
            }
            other => RemoteStoreError::Backend(other.to_string()),
        }
    }
}

/// Remote store backed by a Postgres connection pool
#[derive(Debug, Clone)]
pub struct PgRemoteStore {
    pool: PgPool,
}

impl PgRemoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with the given pool size
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RemoteStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn upsert_draft(&self, draft: &NewContractDraft) -> Result<(), RemoteStoreError> {
        sqlx::query(
            "INSERT INTO visit_contract_drafts \
             (id, visit_id, customer_id, sales_rep_id, contract_accepted, signature_ref, \
              sms_phone, sms_sent, otp_verified, notes, completion_pct, current_stage, \
              last_saved_at, metadata) \
             VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), $12) \
             ON CONFLICT (visit_id) DO UPDATE SET \
               contract_accepted = EXCLUDED.contract_accepted, \
               signature_ref = EXCLUDED.signature_ref, \
               sms_phone = EXCLUDED.sms_phone, \
               sms_sent = EXCLUDED.sms_sent, \
               otp_verified = EXCLUDED.otp_verified, \
               notes = EXCLUDED.notes, \
               completion_pct = EXCLUDED.completion_pct, \
               current_stage = EXCLUDED.current_stage, \
               last_saved_at = NOW(), \
               metadata = EXCLUDED.metadata",
        )
        .bind(draft.visit_id)
        .bind(&draft.customer_id)
        .bind(&draft.sales_rep_id)
        .bind(draft.contract_accepted)
        .bind(&draft.signature_ref)
        .bind(&draft.sms_phone)
        .bind(draft.sms_sent)
        .bind(draft.otp_verified)
        .bind(&draft.notes)
        .bind(draft.completion_pct)
        .bind(&draft.current_stage)
        .bind(&draft.metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_finalized_visit(&self, visit: &FinalizedVisit) -> Result<(), RemoteStoreError> {
        // ON CONFLICT DO NOTHING keeps queue replay idempotent
        sqlx::query(
            "INSERT INTO visits \
             (visit_id, customer_id, sales_rep_id, status, notes, revenue, finalized_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (visit_id) DO NOTHING",
        )
        .bind(visit.visit_id)
        .bind(&visit.customer_id)
        .bind(&visit.sales_rep_id)
        .bind(visit.status.to_string())
        .bind(&visit.notes)
        .bind(visit.revenue)
        .bind(visit.finalized_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct DeleteDraftPayload {
    draft_id: Uuid,
}

#[async_trait]
impl RemoteStore for PgRemoteStore {
    async fn create_draft(
        &self,
        draft: NewContractDraft,
    ) -> Result<ContractDraft, RemoteStoreError> {
        let created = sqlx::query_as::<_, ContractDraft>(&format!(
            "INSERT INTO visit_contract_drafts \
             (id, visit_id, customer_id, sales_rep_id, contract_accepted, signature_ref, \
              sms_phone, sms_sent, otp_verified, notes, completion_pct, current_stage, \
              last_saved_at, metadata) \
             VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), $12) \
             RETURNING {DRAFT_COLUMNS}"
        ))
        .bind(draft.visit_id)
        .bind(&draft.customer_id)
        .bind(&draft.sales_rep_id)
        .bind(draft.contract_accepted)
        .bind(&draft.signature_ref)
        .bind(&draft.sms_phone)
        .bind(draft.sms_sent)
        .bind(draft.otp_verified)
        .bind(&draft.notes)
        .bind(draft.completion_pct)
        .bind(&draft.current_stage)
        .bind(&draft.metadata)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_draft(
        &self,
        draft_id: Uuid,
        patch: DraftPatch,
    ) -> Result<ContractDraft, RemoteStoreError> {
        let updated = sqlx::query_as::<_, ContractDraft>(&format!(
            "UPDATE visit_contract_drafts SET \
               contract_accepted = $2, signature_ref = $3, sms_phone = $4, sms_sent = $5, \
               otp_verified = $6, notes = $7, completion_pct = $8, current_stage = $9, \
               last_saved_at = NOW(), metadata = $10 \
             WHERE id = $1 \
             RETURNING {DRAFT_COLUMNS}"
        ))
        .bind(draft_id)
        .bind(patch.contract_accepted)
        .bind(&patch.signature_ref)
        .bind(&patch.sms_phone)
        .bind(patch.sms_sent)
        .bind(patch.otp_verified)
        .bind(&patch.notes)
        .bind(patch.completion_pct)
        .bind(&patch.current_stage)
        .bind(&patch.metadata)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| RemoteStoreError::NotFound {
            entity: "contract_draft",
            id: draft_id.to_string(),
        })
    }

    async fn latest_draft_for_visit(
        &self,
        visit_id: Uuid,
    ) -> Result<Option<ContractDraft>, RemoteStoreError> {
        let draft = sqlx::query_as::<_, ContractDraft>(&format!(
            "SELECT {DRAFT_COLUMNS} FROM visit_contract_drafts \
             WHERE visit_id = $1 ORDER BY last_saved_at DESC LIMIT 1"
        ))
        .bind(visit_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(draft)
    }

    async fn delete_draft(&self, draft_id: Uuid) -> Result<(), RemoteStoreError> {
        let result = sqlx::query("DELETE FROM visit_contract_drafts WHERE id = $1")
            .bind(draft_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            debug!(draft_id = %draft_id, "Draft already deleted");
        }
        Ok(())
    }

    async fn append_audit(&self, entry: NewAuditEntry) -> Result<(), RemoteStoreError> {
        sqlx::query(
            "INSERT INTO visit_audit_log \
             (visit_id, sales_rep_id, action, description, metadata, created_at) \
             VALUES ($1, $2, $3, $4, $5, NOW())",
        )
        .bind(entry.visit_id)
        .bind(&entry.sales_rep_id)
        .bind(&entry.action)
        .bind(&entry.description)
        .bind(&entry.metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn apply_operation(&self, operation: &QueuedOperation) -> Result<(), RemoteStoreError> {
        match operation.op_type {
            OperationType::SaveDraft => {
                let draft: NewContractDraft = serde_json::from_value(operation.payload.clone())?;
                self.upsert_draft(&draft).await
            }
            OperationType::FinalizeVisit => {
                let visit: FinalizedVisit = serde_json::from_value(operation.payload.clone())?;
                self.insert_finalized_visit(&visit).await
            }
            OperationType::DeleteDraft => {
                let payload: DeleteDraftPayload = serde_json::from_value(operation.payload.clone())?;
                self.delete_draft(payload.draft_id).await
            }
            OperationType::AppendAudit => {
                let entry: NewAuditEntry = serde_json::from_value(operation.payload.clone())?;
                self.append_audit(entry).await
            }
        }
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<String, RemoteStoreError> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO visit_notifications \
             (id, recipient_role, subject, body, metadata, created_at) \
             VALUES (gen_random_uuid(), $1, $2, $3, $4, NOW()) \
             RETURNING id",
        )
        .bind(&notification.recipient_role)
        .bind(&notification.subject)
        .bind(&notification.body)
        .bind(&notification.metadata)
        .fetch_one(&self.pool)
        .await?;
        Ok(id.to_string())
    }

    async fn rep_region(&self, rep_id: &str) -> Result<Option<String>, RemoteStoreError> {
        let region: Option<Option<String>> =
            sqlx::query_scalar("SELECT region FROM sales_reps WHERE rep_id = $1")
                .bind(rep_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(region.flatten())
    }
}
