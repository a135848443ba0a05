use serde::{Deserialize, Serialize};
use std::fmt;

/// Customer classification driving the identity-verification requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    /// Private individual; KYC requires KVKK consent plus SMS verification
    Individual,
    /// Company or institution; KYC requires representative details and consent
    Organizational,
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual => write!(f, "individual"),
            Self::Organizational => write!(f, "organizational"),
        }
    }
}

impl std::str::FromStr for CustomerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(Self::Individual),
            "organizational" => Ok(Self::Organizational),
            _ => Err(format!("Invalid customer type: {s}")),
        }
    }
}

/// Immutable copy of customer identity captured when the visit enters the
/// customer stage.
///
/// The snapshot is deliberately a copy, not a reference to the live customer
/// record: the visit must reflect what the agent confirmed at the door even
/// if the backend record changes mid-visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub customer_id: String,
    pub name: String,
    pub customer_type: CustomerType,
    pub district: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}
