use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::customer::CustomerSnapshot;
use super::visit_data::{ContractData, KycData, OorData, ResultData};
use crate::state_machine::VisitStage;

/// One active visit being processed by an agent.
///
/// The session is owned by the caller and exists only client-side until the
/// visit is finalized; only the contract draft and queued operations cross
/// into persisted storage before that point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitSession {
    /// Assigned when the agent starts the visit, never reused
    pub visit_id: Option<Uuid>,
    pub sales_rep_id: String,
    pub stage: VisitStage,
    pub customer: Option<CustomerSnapshot>,
    pub kyc: KycData,
    pub contract: ContractData,
    pub result: ResultData,
    pub oor: OorData,
    pub started_at: DateTime<Utc>,
}

impl VisitSession {
    pub fn new(sales_rep_id: impl Into<String>) -> Self {
        Self {
            visit_id: None,
            sales_rep_id: sales_rep_id.into(),
            stage: VisitStage::default(),
            customer: None,
            kyc: KycData::default(),
            contract: ContractData::default(),
            result: ResultData::default(),
            oor: OorData::default(),
            started_at: Utc::now(),
        }
    }
}
