use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::store::{DurableQueueStore, DurableStoreError};
use crate::config::SyncQueueConfig;
use crate::constants::events;
use crate::events::EventPublisher;
use crate::models::{OperationType, QueuedOperation};
use crate::persistence::{RemoteStore, RemoteStoreError};

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Durable store error: {0}")]
    Durable(#[from] DurableStoreError),
}

/// Outcome of one drain pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
    /// Operations that crossed the retry cap during this pass
    pub newly_stuck: usize,
}

/// Offline operation queue: buffers state-changing writes while connectivity
/// is lost and replays them, strictly in insertion order, when it returns.
///
/// The in-memory list is mirrored to a durable store on every mutation so a
/// process restart rehydrates pending work before any draining. Draining is
/// serial with a fixed inter-attempt delay; a failed operation keeps its
/// place and is retried on the next pass, after the operations behind it
/// have been attempted. Operations that exhaust their retry budget are
/// reported stuck and stay visible: they keep being attempted each pass and
/// are only ever removed by success or an explicit [`discard`](Self::discard).
#[derive(Clone)]
pub struct OfflineQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    remote: Arc<dyn RemoteStore>,
    durable: Arc<dyn DurableQueueStore>,
    config: SyncQueueConfig,
    events: EventPublisher,
    operations: Mutex<Vec<QueuedOperation>>,
    online: AtomicBool,
    // at most one drain at a time; add/connectivity triggers simply bounce off
    drain_lock: AsyncMutex<()>,
}

impl OfflineQueue {
    /// Build the queue, rehydrating pending operations from the durable
    /// store before anything can drain.
    pub async fn new(
        remote: Arc<dyn RemoteStore>,
        durable: Arc<dyn DurableQueueStore>,
        config: SyncQueueConfig,
        events: EventPublisher,
    ) -> Result<Self, QueueError> {
        let operations = durable.get_all().await?;
        if !operations.is_empty() {
            info!(
                count = operations.len(),
                "Rehydrated offline queue from durable store"
            );
        }

        Ok(Self {
            inner: Arc::new(QueueInner {
                remote,
                durable,
                config,
                events,
                operations: Mutex::new(operations),
                online: AtomicBool::new(true),
                drain_lock: AsyncMutex::new(()),
            }),
        })
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::Acquire)
    }

    /// Number of operations waiting to sync
    pub fn pending_count(&self) -> usize {
        self.inner.operations.lock().len()
    }

    /// Number of operations that have exhausted their retry budget
    pub fn stuck_count(&self) -> usize {
        let max = self.inner.config.max_retries;
        self.inner
            .operations
            .lock()
            .iter()
            .filter(|op| op.is_stuck(max))
            .count()
    }

    /// Enqueue a state-changing operation. Mirrors the queue to durable
    /// storage and, when online, spawns an immediate drain attempt.
    pub async fn add_to_queue(
        &self,
        op_type: OperationType,
        payload: Value,
    ) -> Result<Uuid, QueueError> {
        let operation = QueuedOperation::new(op_type, payload);
        let operation_id = operation.id;
        self.inner.operations.lock().push(operation);
        self.persist_queue().await?;

        debug!(operation_id = %operation_id, op_type = %op_type, "Operation queued");
        self.inner.events.publish(
            events::QUEUE_OPERATION_ENQUEUED,
            json!({
                "operation_id": operation_id,
                "op_type": op_type.to_string(),
                "pending": self.pending_count(),
            }),
        );

        if self.is_online() {
            let queue = self.clone();
            tokio::spawn(async move {
                queue.process_queue().await;
            });
        }
        Ok(operation_id)
    }

    /// Drain the queue: serial sync of every pending operation in insertion
    /// order. Returns an empty report when offline or when another drain is
    /// already running.
    pub async fn process_queue(&self) -> DrainReport {
        let Ok(_guard) = self.inner.drain_lock.try_lock() else {
            debug!("Drain already in progress");
            return DrainReport::default();
        };
        if !self.is_online() {
            debug!("Offline, drain deferred");
            return DrainReport::default();
        }

        let snapshot: Vec<QueuedOperation> = self.inner.operations.lock().clone();
        if snapshot.is_empty() {
            return DrainReport::default();
        }

        let total = snapshot.len();
        info!(total, "📡 Draining offline queue");
        self.inner
            .events
            .publish(events::QUEUE_DRAIN_STARTED, json!({ "total": total }));

        let mut report = DrainReport::default();
        for (index, operation) in snapshot.iter().enumerate() {
            if index > 0 {
                // fixed spacing keeps the backend from being hammered
                sleep(self.inner.config.drain_delay()).await;
            }
            if !self.is_online() {
                warn!("Connectivity lost mid-drain, stopping pass");
                break;
            }

            self.inner.events.publish(
                events::QUEUE_DRAIN_PROGRESS,
                json!({ "current": index + 1, "total": total }),
            );

            report.attempted += 1;
            match self.sync_operation(operation).await {
                Ok(()) => {
                    report.synced += 1;
                    self.remove_operation(operation.id).await;
                    self.inner.events.publish(
                        events::QUEUE_OPERATION_SYNCED,
                        json!({ "operation_id": operation.id }),
                    );
                }
                Err(sync_error) => {
                    report.failed += 1;
                    if self.record_failure(operation.id, &sync_error) {
                        report.newly_stuck += 1;
                    }
                    if let Err(persist_error) = self.persist_queue().await {
                        error!(error = %persist_error, "Failed to mirror retry state");
                    }
                }
            }
        }

        info!(
            synced = report.synced,
            failed = report.failed,
            remaining = self.pending_count(),
            "Drain pass complete"
        );
        self.inner.events.publish(
            events::QUEUE_DRAIN_COMPLETED,
            json!({
                "attempted": report.attempted,
                "synced": report.synced,
                "failed": report.failed,
                "remaining": self.pending_count(),
            }),
        );
        report
    }

    /// User-initiated retry; identical to the automatic drain
    pub async fn manual_sync(&self) -> DrainReport {
        self.process_queue().await
    }

    /// Record a connectivity transition. Going online triggers an immediate
    /// drain attempt; going offline pauses draining without failing anything.
    pub fn set_online(&self, online: bool) {
        let was_online = self.inner.online.swap(online, Ordering::AcqRel);
        if was_online == online {
            return;
        }

        if online {
            info!(pending = self.pending_count(), "Connectivity restored");
            self.inner.events.publish(
                events::CONNECTIVITY_ONLINE,
                json!({ "pending": self.pending_count() }),
            );
            let queue = self.clone();
            tokio::spawn(async move {
                queue.process_queue().await;
            });
        } else {
            info!("Connectivity lost, writes will queue");
            self.inner
                .events
                .publish(events::CONNECTIVITY_OFFLINE, json!({}));
        }
    }

    /// Spawn the periodic safety-net drain, in case an immediate attempt was
    /// itself interrupted. The caller owns the handle.
    pub fn start_periodic_drain(&self) -> JoinHandle<()> {
        let queue = self.clone();
        let period = self.inner.config.periodic_drain_interval();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await; // first tick resolves immediately
            loop {
                ticker.tick().await;
                if queue.is_online() && queue.pending_count() > 0 {
                    queue.process_queue().await;
                }
            }
        })
    }

    /// Explicitly drop a stuck operation after operator inspection
    pub async fn discard(&self, operation_id: Uuid) -> Result<bool, QueueError> {
        let removed = {
            let mut operations = self.inner.operations.lock();
            let before = operations.len();
            operations.retain(|op| op.id != operation_id);
            operations.len() != before
        };

        if removed {
            self.persist_queue().await?;
            info!(operation_id = %operation_id, "Queued operation discarded");
            self.inner.events.publish(
                events::QUEUE_OPERATION_DISCARDED,
                json!({ "operation_id": operation_id }),
            );
        }
        Ok(removed)
    }

    async fn sync_operation(&self, operation: &QueuedOperation) -> Result<(), RemoteStoreError> {
        let deadline = self.inner.config.request_timeout();
        match timeout(deadline, self.inner.remote.apply_operation(operation)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteStoreError::Timeout(deadline)),
        }
    }

    async fn remove_operation(&self, operation_id: Uuid) {
        self.inner
            .operations
            .lock()
            .retain(|op| op.id != operation_id);
        if let Err(persist_error) = self.persist_queue().await {
            error!(error = %persist_error, "Failed to mirror operation removal");
        }
    }

    /// Bump the retry counter (saturating at the cap). Returns true when the
    /// operation crossed the cap during this call.
    fn record_failure(&self, operation_id: Uuid, sync_error: &RemoteStoreError) -> bool {
        let max = self.inner.config.max_retries;
        let newly_stuck = {
            let mut operations = self.inner.operations.lock();
            let Some(operation) = operations.iter_mut().find(|op| op.id == operation_id) else {
                return false;
            };
            let was_stuck = operation.is_stuck(max);
            if sync_error.is_retryable() {
                operation.retry_count = operation.retry_count.saturating_add(1).min(max);
            } else {
                // permanent failure, retrying cannot help
                operation.retry_count = max;
            }
            !was_stuck && operation.is_stuck(max)
        };

        if newly_stuck {
            warn!(
                operation_id = %operation_id,
                max_retries = max,
                error = %sync_error,
                "Queued operation stuck after exhausting retries"
            );
            self.inner.events.publish(
                events::QUEUE_OPERATION_STUCK,
                json!({
                    "operation_id": operation_id,
                    "error": sync_error.to_string(),
                }),
            );
        } else {
            debug!(operation_id = %operation_id, error = %sync_error, "Sync attempt failed, will retry next pass");
        }
        newly_stuck
    }

    // The mirror is clear-then-rewrite of the whole collection; fine for a
    // single session, unsafe for concurrent processes sharing the store.
    async fn persist_queue(&self) -> Result<(), QueueError> {
        let snapshot: Vec<QueuedOperation> = self.inner.operations.lock().clone();
        self.inner.durable.clear().await?;
        for operation in &snapshot {
            self.inner.durable.put(operation).await?;
        }
        Ok(())
    }
}
