//! # Domain Models
//!
//! Data types for the field-sales visit flow: the customer snapshot captured
//! at stage entry, the per-visit accumulators (KYC, contract, result,
//! out-of-region), the persisted contract draft, and the offline queue's
//! operation records.

pub mod contract_draft;
pub mod customer;
pub mod queued_operation;
pub mod records;
pub mod visit_data;
pub mod visit_session;

pub use contract_draft::{ContractDraft, DraftData, DraftPatch, NewContractDraft};
pub use customer::{CustomerSnapshot, CustomerType};
pub use queued_operation::{OperationType, QueuedOperation};
pub use records::{FinalizedVisit, NewAuditEntry, NewNotification};
pub use visit_data::{
    ContractData, ContractUpdate, KycData, KycUpdate, OorData, ResultData, ResultUpdate,
    VisitOutcome,
};
pub use visit_session::VisitSession;
