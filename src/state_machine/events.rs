use serde::{Deserialize, Serialize};

use super::states::VisitStage;
use crate::models::{ContractUpdate, CustomerSnapshot, KycUpdate, ResultUpdate};
use crate::region::RegionCheck;

/// Events that can drive visit stage transitions.
///
/// Merge events (`SetCustomer`, `SetKyc`, `SetContract`, `SetResult`) update
/// accumulated data without advancing the stage; advance events are either
/// unconditional (`StartVisit`, `OorApproved`, `ProceedToResult`) or guarded
/// (`ConfirmCustomer`, `KycOk`, `Finalize`). A guarded event whose guard
/// fails is a silent no-op, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum VisitEvent {
    /// Start the visit; assigns the visit id
    StartVisit,
    /// Merge the confirmed customer snapshot and the region-check outcome
    SetCustomer {
        snapshot: CustomerSnapshot,
        region: RegionCheck,
    },
    /// Record that managerial approval was requested; stage unchanged
    OorApprovalRequested { requested_by: String },
    /// Record the granted approval and advance to identity verification
    OorApproved { approved_by: String },
    /// Advance past customer confirmation for an in-region (or approved) visit
    ConfirmCustomer,
    /// Merge identity-verification fields
    SetKyc(KycUpdate),
    /// Advance to the contract stage when the KYC guard holds
    KycOk,
    /// Merge contract fields; never advances by itself
    SetContract(ContractUpdate),
    /// Explicit step change from contract capture to outcome capture
    ProceedToResult,
    /// Merge outcome data
    SetResult(ResultUpdate),
    /// Close the visit when the finalize guard holds
    Finalize,
    /// Explicit back-navigation to an earlier, non-terminal stage
    BackTo(VisitStage),
}

impl VisitEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StartVisit => "start_visit",
            Self::SetCustomer { .. } => "set_customer",
            Self::OorApprovalRequested { .. } => "oor_approval_requested",
            Self::OorApproved { .. } => "oor_approved",
            Self::ConfirmCustomer => "confirm_customer",
            Self::SetKyc(_) => "set_kyc",
            Self::KycOk => "kyc_ok",
            Self::SetContract(_) => "set_contract",
            Self::ProceedToResult => "proceed_to_result",
            Self::SetResult(_) => "set_result",
            Self::Finalize => "finalize",
            Self::BackTo(_) => "back_to",
        }
    }

    /// Check if this event can move the visit to its terminal stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalize)
    }
}
