use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity-verification outcome accumulated during the KYC stage.
///
/// Individual customers use the consent/SMS pair; organizational customers
/// use the representative fields. The unused half stays at its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KycData {
    /// KVKK (personal data protection) consent, individual path
    pub kvkk_accepted: bool,
    /// SMS identity verification completed, individual path
    pub sms_verified: bool,
    pub representative_name: Option<String>,
    pub representative_phone: Option<String>,
    pub representative_consent: bool,
}

/// Partial KYC update merged into [`KycData`]; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KycUpdate {
    pub kvkk_accepted: Option<bool>,
    pub sms_verified: Option<bool>,
    pub representative_name: Option<String>,
    pub representative_phone: Option<String>,
    pub representative_consent: Option<bool>,
}

impl KycData {
    pub fn apply(&mut self, update: KycUpdate) {
        if let Some(v) = update.kvkk_accepted {
            self.kvkk_accepted = v;
        }
        if let Some(v) = update.sms_verified {
            self.sms_verified = v;
        }
        if let Some(v) = update.representative_name {
            self.representative_name = Some(v);
        }
        if let Some(v) = update.representative_phone {
            self.representative_phone = Some(v);
        }
        if let Some(v) = update.representative_consent {
            self.representative_consent = v;
        }
    }
}

/// Contract-acceptance data accumulated during the contract stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractData {
    pub contract_accepted: bool,
    /// Reference to the captured e-signature image in object storage
    pub signature_ref: Option<String>,
    pub sms_phone: Option<String>,
    pub sms_sent: bool,
    /// OTP entered and confirmed for the contract SMS
    pub sms_verified: bool,
}

/// Partial contract update merged into [`ContractData`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractUpdate {
    pub contract_accepted: Option<bool>,
    pub signature_ref: Option<String>,
    pub sms_phone: Option<String>,
    pub sms_sent: Option<bool>,
    pub sms_verified: Option<bool>,
}

impl ContractData {
    pub fn apply(&mut self, update: ContractUpdate) {
        if let Some(v) = update.contract_accepted {
            self.contract_accepted = v;
        }
        if let Some(v) = update.signature_ref {
            self.signature_ref = Some(v);
        }
        if let Some(v) = update.sms_phone {
            self.sms_phone = Some(v);
        }
        if let Some(v) = update.sms_sent {
            self.sms_sent = v;
        }
        if let Some(v) = update.sms_verified {
            self.sms_verified = v;
        }
    }
}

/// Terminal outcome of a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitOutcome {
    Completed,
    Rejected,
    NoAnswer,
    Cancelled,
}

impl fmt::Display for VisitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Rejected => write!(f, "rejected"),
            Self::NoAnswer => write!(f, "no_answer"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for VisitOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            "no_answer" => Ok(Self::NoAnswer),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid visit outcome: {s}")),
        }
    }
}

/// Result-stage data: outcome tag, free-text notes, optional revenue amount
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
    pub status: Option<VisitOutcome>,
    pub notes: Option<String>,
    pub revenue: Option<f64>,
}

/// Partial result update merged into [`ResultData`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultUpdate {
    pub status: Option<VisitOutcome>,
    pub notes: Option<String>,
    pub revenue: Option<f64>,
}

impl ResultData {
    pub fn apply(&mut self, update: ResultUpdate) {
        if let Some(v) = update.status {
            self.status = Some(v);
        }
        if let Some(v) = update.notes {
            self.notes = Some(v);
        }
        if let Some(v) = update.revenue {
            self.revenue = Some(v);
        }
    }
}

/// Out-of-region bookkeeping for a visit whose customer district does not
/// match the rep's assigned region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OorData {
    pub is_out_of_region: bool,
    pub approval_requested: bool,
    pub approval_granted: bool,
    pub requested_by: Option<String>,
    pub approved_by: Option<String>,
    pub customer_district: Option<String>,
    pub rep_region: Option<String>,
}
