use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AutoSaveConfig;
use crate::constants::{audit, events};
use crate::events::EventPublisher;
use crate::models::{ContractDraft, DraftData, NewAuditEntry};
use crate::persistence::{RemoteStore, RemoteStoreError};

/// Save status surfaced next to the contract form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Saving => write!(f, "saving"),
            Self::Saved => write!(f, "saved"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Errors surfaced by explicit save operations
#[derive(Debug, thiserror::Error)]
pub enum AutoSaveError {
    /// Every attempt failed; the last cause is attached
    #[error("Save failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: RemoteStoreError,
    },

    #[error(transparent)]
    Store(#[from] RemoteStoreError),
}

/// Debounced auto-saver for in-progress contract drafts.
///
/// Feed it every form change through [`record_change`](Self::record_change);
/// it debounces, skips saves whose serialized payload matches the last
/// successful one, creates the draft on first save (capturing the
/// server-assigned id), and updates it afterwards. Transient failures retry
/// with linear backoff up to the configured cap; terminal failures surface
/// as an `Error` status plus a `draft.save_failed` event, never a panic.
///
/// Save cycles are serialized and each carries a monotonic sequence number;
/// a cycle's result is applied only if no later cycle has applied already,
/// so a superseded save can never clobber a newer one.
#[derive(Clone)]
pub struct DraftAutoSaver {
    inner: Arc<SaverInner>,
}

struct SaverInner {
    remote: Arc<dyn RemoteStore>,
    config: AutoSaveConfig,
    events: EventPublisher,
    state: Mutex<SaverState>,
    // serializes save cycles so overlapping creates cannot mint duplicates
    save_lock: AsyncMutex<()>,
}

#[derive(Default)]
struct SaverState {
    draft_id: Option<Uuid>,
    last_saved_snapshot: Option<String>,
    pending: Option<DraftData>,
    status: SaveStatus,
    last_saved_at: Option<DateTime<Utc>>,
    next_seq: u64,
    applied_seq: u64,
    debounce: Option<JoinHandle<()>>,
    idle_revert: Option<JoinHandle<()>>,
}

impl DraftAutoSaver {
    pub fn new(remote: Arc<dyn RemoteStore>, config: AutoSaveConfig, events: EventPublisher) -> Self {
        Self {
            inner: Arc::new(SaverInner {
                remote,
                config,
                events,
                state: Mutex::new(SaverState::default()),
                save_lock: AsyncMutex::new(()),
            }),
        }
    }

    /// Current save status
    pub fn status(&self) -> SaveStatus {
        self.inner.state.lock().status
    }

    /// Timestamp of the last successful save
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.inner.state.lock().last_saved_at
    }

    /// Server-assigned draft id, once the first save has completed
    pub fn draft_id(&self) -> Option<Uuid> {
        self.inner.state.lock().draft_id
    }

    /// Register a form change. Restarts the debounce window; when it elapses
    /// without further input, a save cycle runs. With auto-save disabled the
    /// data is still staged for [`manual_save`](Self::manual_save).
    pub fn record_change(&self, data: DraftData) {
        let mut state = self.inner.state.lock();
        state.pending = Some(data);

        if let Some(handle) = state.debounce.take() {
            handle.abort();
        }
        if !self.inner.config.enabled {
            return;
        }

        let saver = self.clone();
        let delay = self.inner.config.debounce();
        state.debounce = Some(tokio::spawn(async move {
            sleep(delay).await;
            // past the window: detach so a manual save can no longer abort us
            saver.inner.state.lock().debounce = None;
            if let Err(error) = saver.save_pending().await {
                warn!(error = %error, "Auto-save cycle failed");
            }
        }));
    }

    /// Cancel any pending debounce and save immediately ("save and exit")
    pub async fn manual_save(&self) -> Result<Option<ContractDraft>, AutoSaveError> {
        {
            let mut state = self.inner.state.lock();
            if let Some(handle) = state.debounce.take() {
                handle.abort();
            }
        }
        self.save_pending().await
    }

    /// Fetch the most recently saved draft for a visit (crash / session
    /// recovery). Tracks its id so subsequent saves update it.
    pub async fn load_draft(&self, visit_id: Uuid) -> Result<Option<ContractDraft>, RemoteStoreError> {
        let draft = self.inner.remote.latest_draft_for_visit(visit_id).await?;
        if let Some(found) = &draft {
            let mut state = self.inner.state.lock();
            state.draft_id = Some(found.id);
            state.last_saved_at = Some(found.last_saved_at);
        }
        Ok(draft)
    }

    /// Remove the draft once the visit is finalized and clear local tracking
    /// so a later edit would create a fresh draft.
    pub async fn delete_draft(&self) -> Result<(), RemoteStoreError> {
        let draft_id = {
            let mut state = self.inner.state.lock();
            if let Some(handle) = state.debounce.take() {
                handle.abort();
            }
            state.pending = None;
            state.last_saved_snapshot = None;
            state.status = SaveStatus::Idle;
            state.draft_id.take()
        };

        let Some(id) = draft_id else {
            return Ok(());
        };
        self.inner.remote.delete_draft(id).await?;
        info!(draft_id = %id, "Draft deleted after finalize");
        self.inner
            .events
            .publish(events::DRAFT_DELETED, json!({ "draft_id": id }));
        Ok(())
    }

    async fn save_pending(&self) -> Result<Option<ContractDraft>, AutoSaveError> {
        let _guard = self.inner.save_lock.lock().await;

        let (data, snapshot, seq, draft_id) = {
            let mut state = self.inner.state.lock();
            let Some(data) = state.pending.clone() else {
                return Ok(None);
            };
            let snapshot = data.snapshot().map_err(RemoteStoreError::from)?;
            if state.last_saved_snapshot.as_deref() == Some(snapshot.as_str()) {
                debug!(visit_id = %data.visit_id, "Draft unchanged, save skipped");
                self.inner.events.publish(
                    events::DRAFT_SAVE_SKIPPED,
                    json!({ "visit_id": data.visit_id }),
                );
                return Ok(None);
            }
            state.next_seq += 1;
            state.status = SaveStatus::Saving;
            (data, snapshot, state.next_seq, state.draft_id)
        };

        match self.attempt_save_with_retry(&data, draft_id).await {
            Ok(draft) => {
                self.apply_success(seq, snapshot, &draft);
                self.append_audit_entry(&data, &draft).await;
                Ok(Some(draft))
            }
            Err((attempts, error)) => {
                self.apply_failure(seq, &error);
                Err(AutoSaveError::RetriesExhausted {
                    attempts,
                    source: error,
                })
            }
        }
    }

    async fn attempt_save_with_retry(
        &self,
        data: &DraftData,
        draft_id: Option<Uuid>,
    ) -> Result<ContractDraft, (u32, RemoteStoreError)> {
        let max_attempts = self.inner.config.max_retries.max(1);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.attempt_save(data, draft_id).await {
                Ok(draft) => return Ok(draft),
                Err(error) => {
                    if !error.is_retryable() || attempt >= max_attempts {
                        return Err((attempt, error));
                    }
                    let delay = self.inner.config.retry_delay(attempt);
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Save attempt failed, backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn attempt_save(
        &self,
        data: &DraftData,
        draft_id: Option<Uuid>,
    ) -> Result<ContractDraft, RemoteStoreError> {
        let deadline = self.inner.config.request_timeout();
        let result = match draft_id {
            Some(id) => timeout(deadline, self.inner.remote.update_draft(id, data.to_patch())).await,
            None => timeout(deadline, self.inner.remote.create_draft(data.to_new_draft())).await,
        };
        result.unwrap_or(Err(RemoteStoreError::Timeout(deadline)))
    }

    fn apply_success(&self, seq: u64, snapshot: String, draft: &ContractDraft) {
        {
            let mut state = self.inner.state.lock();
            if seq < state.applied_seq {
                debug!(seq, applied = state.applied_seq, "Stale save result discarded");
                return;
            }
            state.applied_seq = seq;
            state.draft_id = Some(draft.id);
            state.last_saved_snapshot = Some(snapshot);
            state.status = SaveStatus::Saved;
            state.last_saved_at = Some(Utc::now());

            if let Some(handle) = state.idle_revert.take() {
                handle.abort();
            }
            let saver = self.clone();
            let display = self.inner.config.status_display();
            state.idle_revert = Some(tokio::spawn(async move {
                sleep(display).await;
                let mut state = saver.inner.state.lock();
                if state.status == SaveStatus::Saved {
                    state.status = SaveStatus::Idle;
                }
            }));
        }

        info!(
            draft_id = %draft.id,
            completion_pct = draft.completion_pct,
            stage = %draft.current_stage,
            "💾 Draft saved"
        );
        self.inner.events.publish(
            events::DRAFT_SAVED,
            json!({
                "visit_id": draft.visit_id,
                "draft_id": draft.id,
                "completion_pct": draft.completion_pct,
                "current_stage": draft.current_stage,
            }),
        );
    }

    fn apply_failure(&self, seq: u64, error: &RemoteStoreError) {
        {
            let mut state = self.inner.state.lock();
            if seq < state.applied_seq {
                debug!(seq, applied = state.applied_seq, "Stale save failure discarded");
                return;
            }
            state.applied_seq = seq;
            state.status = SaveStatus::Error;
        }

        warn!(error = %error, "Draft save failed after retries");
        self.inner.events.publish(
            events::DRAFT_SAVE_FAILED,
            json!({ "error": error.to_string() }),
        );
    }

    // Best-effort side channel: audit failures are logged, never surfaced
    async fn append_audit_entry(&self, data: &DraftData, draft: &ContractDraft) {
        let entry = NewAuditEntry {
            visit_id: draft.visit_id,
            sales_rep_id: data.sales_rep_id.clone(),
            action: audit::DRAFT_SAVED.to_string(),
            description: format!("Contract draft saved at {}%", draft.completion_pct),
            metadata: json!({
                "draft_id": draft.id,
                "completion_pct": draft.completion_pct,
                "current_stage": draft.current_stage,
            }),
        };
        if let Err(error) = self.inner.remote.append_audit(entry).await {
            warn!(error = %error, "Audit append failed, continuing");
        }
    }
}
