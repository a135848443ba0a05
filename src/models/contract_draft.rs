//! # Contract Draft Model
//!
//! Persisted snapshot of in-progress contract data, one-to-one with an open
//! visit. Created on the first auto-save, updated on each subsequent save,
//! and deleted when the visit is finalized.
//!
//! Completion is tracked as 25 points per fulfilled requirement (contract
//! accepted, signature captured, SMS sent, OTP verified), so a draft is
//! always at 0/25/50/75/100 percent with a derived stage label the UI can
//! show directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::visit_data::ContractData;
use crate::constants::system::COMPLETION_STEP_PCT;

/// Persisted contract draft as stored in the hosted backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ContractDraft {
    pub id: Uuid,
    pub visit_id: Uuid,
    pub customer_id: String,
    pub sales_rep_id: String,
    pub contract_accepted: bool,
    pub signature_ref: Option<String>,
    pub sms_phone: Option<String>,
    pub sms_sent: bool,
    pub otp_verified: bool,
    pub notes: Option<String>,
    pub completion_pct: i32,
    pub current_stage: String,
    pub last_saved_at: DateTime<Utc>,
    pub metadata: Value,
}

/// New draft for creation (id and save timestamp are server-assigned)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContractDraft {
    pub visit_id: Uuid,
    pub customer_id: String,
    pub sales_rep_id: String,
    pub contract_accepted: bool,
    pub signature_ref: Option<String>,
    pub sms_phone: Option<String>,
    pub sms_sent: bool,
    pub otp_verified: bool,
    pub notes: Option<String>,
    pub completion_pct: i32,
    pub current_stage: String,
    pub metadata: Value,
}

/// Update applied to an existing draft by its server-assigned id.
///
/// The auto-saver always holds the full draft, so the patch carries every
/// mutable field rather than per-field options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPatch {
    pub contract_accepted: bool,
    pub signature_ref: Option<String>,
    pub sms_phone: Option<String>,
    pub sms_sent: bool,
    pub otp_verified: bool,
    pub notes: Option<String>,
    pub completion_pct: i32,
    pub current_stage: String,
    pub metadata: Value,
}

/// Continuously-updating draft input watched by the auto-saver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftData {
    pub visit_id: Uuid,
    pub customer_id: String,
    pub sales_rep_id: String,
    pub contract: ContractData,
    pub notes: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

impl DraftData {
    /// Completion percentage: 25 points each for contract-accept, signature,
    /// SMS-sent, and OTP-verified.
    pub fn completion_pct(&self) -> i32 {
        let steps = [
            self.contract.contract_accepted,
            self.contract.signature_ref.is_some(),
            self.contract.sms_sent,
            self.contract.sms_verified,
        ];
        steps.iter().filter(|done| **done).count() as i32 * i32::from(COMPLETION_STEP_PCT)
    }

    /// Derived stage label for UI display, following the requirement order
    pub fn current_stage(&self) -> &'static str {
        if !self.contract.contract_accepted {
            "contract_review"
        } else if self.contract.signature_ref.is_none() {
            "signature"
        } else if !self.contract.sms_sent {
            "sms_dispatch"
        } else if !self.contract.sms_verified {
            "sms_verification"
        } else {
            "ready_to_finalize"
        }
    }

    /// Serialized snapshot used for idempotent change detection
    pub fn snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_new_draft(&self) -> NewContractDraft {
        NewContractDraft {
            visit_id: self.visit_id,
            customer_id: self.customer_id.clone(),
            sales_rep_id: self.sales_rep_id.clone(),
            contract_accepted: self.contract.contract_accepted,
            signature_ref: self.contract.signature_ref.clone(),
            sms_phone: self.contract.sms_phone.clone(),
            sms_sent: self.contract.sms_sent,
            otp_verified: self.contract.sms_verified,
            notes: self.notes.clone(),
            completion_pct: self.completion_pct(),
            current_stage: self.current_stage().to_string(),
            metadata: self.metadata.clone(),
        }
    }

    pub fn to_patch(&self) -> DraftPatch {
        DraftPatch {
            contract_accepted: self.contract.contract_accepted,
            signature_ref: self.contract.signature_ref.clone(),
            sms_phone: self.contract.sms_phone.clone(),
            sms_sent: self.contract.sms_sent,
            otp_verified: self.contract.sms_verified,
            notes: self.notes.clone(),
            completion_pct: self.completion_pct(),
            current_stage: self.current_stage().to_string(),
            metadata: self.metadata.clone(),
        }
    }
}
