//! # Test Helpers
//!
//! In-memory remote store with scripted failures and call accounting, shared
//! by the crate's unit tests and the integration suites in `tests/`.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::{
    ContractDraft, DraftPatch, NewAuditEntry, NewContractDraft, NewNotification, QueuedOperation,
};
use crate::persistence::{RemoteStore, RemoteStoreError};

/// In-memory [`RemoteStore`] double.
///
/// Failure scripting: [`fail_next_saves`](Self::fail_next_saves) makes the
/// next N draft writes fail with a retryable connection error;
/// [`fail_operation`](Self::fail_operation) fails a specific queued
/// operation's replay N times before letting it succeed;
/// [`fail_operation_permanently`](Self::fail_operation_permanently) rejects
/// it with a non-retryable validation error forever.
#[derive(Default)]
pub struct InMemoryRemoteStore {
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    drafts: Vec<ContractDraft>,
    audits: Vec<NewAuditEntry>,
    notifications: Vec<NewNotification>,
    regions: HashMap<String, String>,
    attempt_log: Vec<Uuid>,
    applied_operations: Vec<Uuid>,
    create_calls: u32,
    update_calls: u32,
    failing_saves: u32,
    fail_audits: bool,
    operation_failures: HashMap<Uuid, u32>,
    permanent_operation_failures: HashSet<Uuid>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rep_region(&self, rep_id: impl Into<String>, region: impl Into<String>) {
        self.state.lock().regions.insert(rep_id.into(), region.into());
    }

    /// Make the next `count` create/update calls fail with a retryable error
    pub fn fail_next_saves(&self, count: u32) {
        self.state.lock().failing_saves = count;
    }

    /// Make audit appends fail (for testing the swallowed side channel)
    pub fn fail_audits(&self, fail: bool) {
        self.state.lock().fail_audits = fail;
    }

    /// Fail replay of the given operation `times` times, then succeed
    pub fn fail_operation(&self, operation_id: Uuid, times: u32) {
        self.state.lock().operation_failures.insert(operation_id, times);
    }

    /// Reject replay of the given operation with a non-retryable error
    pub fn fail_operation_permanently(&self, operation_id: Uuid) {
        self.state
            .lock()
            .permanent_operation_failures
            .insert(operation_id);
    }

    /// Total draft writes attempted (creates plus updates)
    pub fn save_calls(&self) -> u32 {
        let state = self.state.lock();
        state.create_calls + state.update_calls
    }

    pub fn create_calls(&self) -> u32 {
        self.state.lock().create_calls
    }

    pub fn update_calls(&self) -> u32 {
        self.state.lock().update_calls
    }

    /// Every `apply_operation` call in order, successful or not
    pub fn attempt_log(&self) -> Vec<Uuid> {
        self.state.lock().attempt_log.clone()
    }

    /// Operations that replayed successfully, in order
    pub fn applied_operations(&self) -> Vec<Uuid> {
        self.state.lock().applied_operations.clone()
    }

    pub fn drafts(&self) -> Vec<ContractDraft> {
        self.state.lock().drafts.clone()
    }

    pub fn audit_count(&self) -> usize {
        self.state.lock().audits.len()
    }

    pub fn notification_count(&self) -> usize {
        self.state.lock().notifications.len()
    }

    fn take_scripted_save_failure(state: &mut StoreState) -> Option<RemoteStoreError> {
        if state.failing_saves > 0 {
            state.failing_saves -= 1;
            Some(RemoteStoreError::Connection(
                "scripted connection failure".to_string(),
            ))
        } else {
            None
        }
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn create_draft(
        &self,
        draft: NewContractDraft,
    ) -> Result<ContractDraft, RemoteStoreError> {
        let mut state = self.state.lock();
        state.create_calls += 1;
        if let Some(error) = Self::take_scripted_save_failure(&mut state) {
            return Err(error);
        }

        let created = ContractDraft {
            id: Uuid::new_v4(),
            visit_id: draft.visit_id,
            customer_id: draft.customer_id,
            sales_rep_id: draft.sales_rep_id,
            contract_accepted: draft.contract_accepted,
            signature_ref: draft.signature_ref,
            sms_phone: draft.sms_phone,
            sms_sent: draft.sms_sent,
            otp_verified: draft.otp_verified,
            notes: draft.notes,
            completion_pct: draft.completion_pct,
            current_stage: draft.current_stage,
            last_saved_at: Utc::now(),
            metadata: draft.metadata,
        };
        state.drafts.push(created.clone());
        Ok(created)
    }

    async fn update_draft(
        &self,
        draft_id: Uuid,
        patch: DraftPatch,
    ) -> Result<ContractDraft, RemoteStoreError> {
        let mut state = self.state.lock();
        state.update_calls += 1;
        if let Some(error) = Self::take_scripted_save_failure(&mut state) {
            return Err(error);
        }

        let draft = state
            .drafts
            .iter_mut()
            .find(|d| d.id == draft_id)
            .ok_or(RemoteStoreError::NotFound {
                entity: "contract_draft",
                id: draft_id.to_string(),
            })?;
        draft.contract_accepted = patch.contract_accepted;
        draft.signature_ref = patch.signature_ref;
        draft.sms_phone = patch.sms_phone;
        draft.sms_sent = patch.sms_sent;
        draft.otp_verified = patch.otp_verified;
        draft.notes = patch.notes;
        draft.completion_pct = patch.completion_pct;
        draft.current_stage = patch.current_stage;
        draft.metadata = patch.metadata;
        draft.last_saved_at = Utc::now();
        Ok(draft.clone())
    }

    async fn latest_draft_for_visit(
        &self,
        visit_id: Uuid,
    ) -> Result<Option<ContractDraft>, RemoteStoreError> {
        let state = self.state.lock();
        Ok(state
            .drafts
            .iter()
            .filter(|d| d.visit_id == visit_id)
            .max_by_key(|d| d.last_saved_at)
            .cloned())
    }

    async fn delete_draft(&self, draft_id: Uuid) -> Result<(), RemoteStoreError> {
        self.state.lock().drafts.retain(|d| d.id != draft_id);
        Ok(())
    }

    async fn append_audit(&self, entry: NewAuditEntry) -> Result<(), RemoteStoreError> {
        let mut state = self.state.lock();
        if state.fail_audits {
            return Err(RemoteStoreError::Backend(
                "scripted audit failure".to_string(),
            ));
        }
        state.audits.push(entry);
        Ok(())
    }

    async fn apply_operation(&self, operation: &QueuedOperation) -> Result<(), RemoteStoreError> {
        let mut state = self.state.lock();
        state.attempt_log.push(operation.id);

        if state.permanent_operation_failures.contains(&operation.id) {
            return Err(RemoteStoreError::Validation(
                "scripted permanent rejection".to_string(),
            ));
        }
        if let Some(remaining) = state.operation_failures.get_mut(&operation.id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RemoteStoreError::Backend(
                    "scripted transient failure".to_string(),
                ));
            }
        }

        state.applied_operations.push(operation.id);
        Ok(())
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<String, RemoteStoreError> {
        let mut state = self.state.lock();
        state.notifications.push(notification);
        Ok(Uuid::new_v4().to_string())
    }

    async fn rep_region(&self, rep_id: &str) -> Result<Option<String>, RemoteStoreError> {
        Ok(self.state.lock().regions.get(rep_id).cloned())
    }
}
