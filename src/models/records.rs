use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::visit_data::VisitOutcome;
use super::visit_session::VisitSession;

/// Audit-log entry appended after state-changing operations.
///
/// The audit channel is best-effort: its failures are logged and swallowed,
/// never surfaced through the save contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditEntry {
    pub visit_id: Uuid,
    pub sales_rep_id: String,
    pub action: String,
    pub description: String,
    pub metadata: Value,
}

/// Notification record created for out-of-region approval requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub recipient_role: String,
    pub subject: String,
    pub body: String,
    pub metadata: Value,
}

/// Finalized visit record written to the backend when a visit closes.
///
/// This is the payload of a `FinalizeVisit` queued operation, so a visit
/// closed while offline still lands exactly once when connectivity returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedVisit {
    pub visit_id: Uuid,
    pub customer_id: String,
    pub sales_rep_id: String,
    pub status: VisitOutcome,
    pub notes: Option<String>,
    pub revenue: Option<f64>,
    pub finalized_at: DateTime<Utc>,
}

impl FinalizedVisit {
    /// Build the finalized record from a completed session.
    ///
    /// Returns `None` unless the session has both an assigned visit id and a
    /// recorded outcome, i.e. unless the finalize guard could have passed.
    pub fn from_session(session: &VisitSession) -> Option<Self> {
        let visit_id = session.visit_id?;
        let status = session.result.status?;
        let customer_id = session.customer.as_ref()?.customer_id.clone();
        Some(Self {
            visit_id,
            customer_id,
            sales_rep_id: session.sales_rep_id.clone(),
            status,
            notes: session.result.notes.clone(),
            revenue: session.result.revenue,
            finalized_at: Utc::now(),
        })
    }
}
