//! Guard predicates gating visit stage transitions.
//!
//! Guards are pure boolean functions over the accumulated session state,
//! evaluated at dispatch time. The same predicates back both UI enablement
//! ("is the continue button active") and transition legality, so the two can
//! never diverge. A failed guard silently rejects the transition; callers
//! that need to know why check the guard directly.

use crate::models::{CustomerType, VisitSession};

/// Trait for stage transition guards
pub trait StageGuard {
    /// Check if the transition is allowed for this session
    fn check(&self, session: &VisitSession) -> bool;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Guard for advancing past customer confirmation: a snapshot must be
/// captured, and an out-of-region visit must already hold approval.
pub struct CustomerConfirmedGuard;

impl StageGuard for CustomerConfirmedGuard {
    fn check(&self, session: &VisitSession) -> bool {
        session.customer.is_some()
            && (!session.oor.is_out_of_region || session.oor.approval_granted)
    }

    fn description(&self) -> &'static str {
        "Customer snapshot captured and region resolved"
    }
}

/// Guard for advancing from identity verification to the contract stage.
///
/// Individual customers need KVKK consent plus SMS verification;
/// organizational customers need representative name, phone, and consent.
pub struct KycCompleteGuard;

impl StageGuard for KycCompleteGuard {
    fn check(&self, session: &VisitSession) -> bool {
        match session.customer.as_ref().map(|c| c.customer_type) {
            Some(CustomerType::Individual) => {
                session.kyc.kvkk_accepted && session.kyc.sms_verified
            }
            Some(CustomerType::Organizational) => {
                has_text(session.kyc.representative_name.as_deref())
                    && has_text(session.kyc.representative_phone.as_deref())
                    && session.kyc.representative_consent
            }
            None => false,
        }
    }

    fn description(&self) -> &'static str {
        "Type-appropriate identity verification complete"
    }
}

/// Guard for finalizing the visit: contract accepted and SMS-verified, an
/// outcome recorded, and (for out-of-region visits) approval granted.
pub struct FinalizeReadyGuard;

impl StageGuard for FinalizeReadyGuard {
    fn check(&self, session: &VisitSession) -> bool {
        session.contract.contract_accepted
            && session.contract.sms_verified
            && session.result.status.is_some()
            && (!session.oor.is_out_of_region || session.oor.approval_granted)
    }

    fn description(&self) -> &'static str {
        "Contract confirmed, outcome recorded, region approval resolved"
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}
