use serde::{Deserialize, Serialize};
use std::fmt;

/// Visit stage definitions for the field-sales visit flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStage {
    /// Initial state before the agent starts the visit
    Setup,
    /// Customer confirmation and region check
    Customer,
    /// Identity verification (consent/SMS or representative details)
    Kyc,
    /// Contract acceptance, signature, and SMS confirmation
    Contract,
    /// Outcome capture
    Result,
    /// Visit finalized
    Done,
}

impl VisitStage {
    /// Check if this is the terminal stage (no further events accepted)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Position in the forward stage sequence, used to validate back-navigation
    pub fn order_index(&self) -> u8 {
        match self {
            Self::Setup => 0,
            Self::Customer => 1,
            Self::Kyc => 2,
            Self::Contract => 3,
            Self::Result => 4,
            Self::Done => 5,
        }
    }
}

impl fmt::Display for VisitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Customer => write!(f, "customer"),
            Self::Kyc => write!(f, "kyc"),
            Self::Contract => write!(f, "contract"),
            Self::Result => write!(f, "result"),
            Self::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for VisitStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setup" => Ok(Self::Setup),
            "customer" => Ok(Self::Customer),
            "kyc" => Ok(Self::Kyc),
            "contract" => Ok(Self::Contract),
            "result" => Ok(Self::Result),
            "done" => Ok(Self::Done),
            _ => Err(format!("Invalid visit stage: {s}")),
        }
    }
}

impl Default for VisitStage {
    fn default() -> Self {
        Self::Setup
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_check() {
        assert!(VisitStage::Done.is_terminal());
        assert!(!VisitStage::Setup.is_terminal());
        assert!(!VisitStage::Result.is_terminal());
    }

    #[test]
    fn test_order_is_strictly_increasing() {
        let stages = [
            VisitStage::Setup,
            VisitStage::Customer,
            VisitStage::Kyc,
            VisitStage::Contract,
            VisitStage::Result,
            VisitStage::Done,
        ];
        for pair in stages.windows(2) {
            assert!(pair[0].order_index() < pair[1].order_index());
        }
    }

    #[test]
    fn test_stage_string_conversion() {
        assert_eq!(VisitStage::Kyc.to_string(), "kyc");
        assert_eq!("contract".parse::<VisitStage>().unwrap(), VisitStage::Contract);
        assert!("checkout".parse::<VisitStage>().is_err());
    }

    #[test]
    fn test_stage_serde() {
        let json = serde_json::to_string(&VisitStage::Result).unwrap();
        assert_eq!(json, "\"result\"");
        let parsed: VisitStage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, VisitStage::Result);
    }
}
