use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// State-changing operation kinds the offline queue can replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    SaveDraft,
    FinalizeVisit,
    DeleteDraft,
    AppendAudit,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SaveDraft => write!(f, "save_draft"),
            Self::FinalizeVisit => write!(f, "finalize_visit"),
            Self::DeleteDraft => write!(f, "delete_draft"),
            Self::AppendAudit => write!(f, "append_audit"),
        }
    }
}

impl std::str::FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "save_draft" => Ok(Self::SaveDraft),
            "finalize_visit" => Ok(Self::FinalizeVisit),
            "delete_draft" => Ok(Self::DeleteDraft),
            "append_audit" => Ok(Self::AppendAudit),
            _ => Err(format!("Invalid operation type: {s}")),
        }
    }
}

/// Pending state-changing request not yet acknowledged by the remote store.
///
/// Created when a write is attempted while offline; removed on successful
/// replay. The retry counter saturates at the configured cap; a saturated
/// operation is reported stuck but never silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedOperation {
    pub id: Uuid,
    pub op_type: OperationType,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub retry_count: u32,
}

impl QueuedOperation {
    pub fn new(op_type: OperationType, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            op_type,
            payload,
            created_at: Utc::now(),
            retry_count: 0,
        }
    }

    /// Whether this operation has exhausted its retry budget
    pub fn is_stuck(&self, max_retries: u32) -> bool {
        self.retry_count >= max_retries
    }
}
