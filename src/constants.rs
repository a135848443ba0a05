//! # System Constants
//!
//! Event names, tuning defaults, and operational boundaries shared by the
//! visit workflow, the draft auto-saver, and the offline sync queue.

/// Lifecycle events published through the [`EventPublisher`](crate::events::EventPublisher)
pub mod events {
    // Visit lifecycle events
    pub const VISIT_STARTED: &str = "visit.started";
    pub const VISIT_STAGE_CHANGED: &str = "visit.stage_changed";
    pub const VISIT_FINALIZED: &str = "visit.finalized";
    pub const VISIT_OOR_DETECTED: &str = "visit.out_of_region_detected";
    pub const VISIT_OOR_APPROVAL_REQUESTED: &str = "visit.oor_approval_requested";
    pub const VISIT_OOR_APPROVED: &str = "visit.oor_approved";

    // Draft auto-save events
    pub const DRAFT_SAVED: &str = "draft.saved";
    pub const DRAFT_SAVE_SKIPPED: &str = "draft.save_skipped";
    pub const DRAFT_SAVE_FAILED: &str = "draft.save_failed";
    pub const DRAFT_DELETED: &str = "draft.deleted";

    // Offline queue events
    pub const QUEUE_OPERATION_ENQUEUED: &str = "queue.operation_enqueued";
    pub const QUEUE_DRAIN_STARTED: &str = "queue.drain_started";
    pub const QUEUE_DRAIN_PROGRESS: &str = "queue.drain_progress";
    pub const QUEUE_DRAIN_COMPLETED: &str = "queue.drain_completed";
    pub const QUEUE_OPERATION_SYNCED: &str = "queue.operation_synced";
    pub const QUEUE_OPERATION_STUCK: &str = "queue.operation_stuck";
    pub const QUEUE_OPERATION_DISCARDED: &str = "queue.operation_discarded";

    // Connectivity events
    pub const CONNECTIVITY_ONLINE: &str = "connectivity.online";
    pub const CONNECTIVITY_OFFLINE: &str = "connectivity.offline";
}

/// Audit-log action tags written alongside successful saves
pub mod audit {
    pub const DRAFT_SAVED: &str = "contract_draft_saved";
    pub const DRAFT_DELETED: &str = "contract_draft_deleted";
    pub const VISIT_FINALIZED: &str = "visit_finalized";
}

/// Tuning defaults, overridable through [`VisitCoreConfig`](crate::config::VisitCoreConfig)
pub mod defaults {
    /// Debounce window before an auto-save fires
    pub const AUTOSAVE_DEBOUNCE_MS: u64 = 2_000;

    /// How long the `Saved` status stays visible before reverting to `Idle`
    pub const SAVED_STATUS_DISPLAY_MS: u64 = 2_000;

    /// Maximum save attempts per auto-save cycle
    pub const AUTOSAVE_MAX_RETRIES: u32 = 3;

    /// Base delay for the linear save backoff (`attempt * base`)
    pub const AUTOSAVE_RETRY_BASE_DELAY_MS: u64 = 1_000;

    /// Fixed delay between queued-operation sync attempts within one drain pass
    pub const QUEUE_DRAIN_DELAY_MS: u64 = 500;

    /// Safety-net drain interval while online with a non-empty queue
    pub const QUEUE_PERIODIC_DRAIN_SECS: u64 = 30;

    /// Retry cap before a queued operation is reported stuck
    pub const QUEUE_MAX_RETRIES: u32 = 3;

    /// Per-request timeout for remote store calls
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;
}

/// System-wide constants
pub mod system {
    /// Unknown value placeholder
    pub const UNKNOWN: &str = "unknown";

    /// Version compatibility marker
    pub const VISITFLOW_CORE_VERSION: &str = "0.1.0";

    /// Completion points granted per fulfilled contract requirement
    pub const COMPLETION_STEP_PCT: u8 = 25;
}
