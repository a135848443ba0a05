//! Shared builders for the integration suites.

#![allow(dead_code)]

use serde_json::Value;
use uuid::Uuid;

use visitflow_core::config::{AutoSaveConfig, SyncQueueConfig};
use visitflow_core::models::{ContractData, CustomerSnapshot, CustomerType, DraftData};

pub fn individual_customer(district: &str) -> CustomerSnapshot {
    CustomerSnapshot {
        customer_id: "cust-100".to_string(),
        name: "Mehmet Demir".to_string(),
        customer_type: CustomerType::Individual,
        district: district.to_string(),
        address: Some("Moda Cad. 12".to_string()),
        phone: Some("+90 555 111 2233".to_string()),
    }
}

pub fn organizational_customer(district: &str) -> CustomerSnapshot {
    CustomerSnapshot {
        customer_id: "cust-200".to_string(),
        name: "Demir Enerji A.Ş.".to_string(),
        customer_type: CustomerType::Organizational,
        district: district.to_string(),
        address: None,
        phone: None,
    }
}

pub fn draft_data(visit_id: Uuid) -> DraftData {
    DraftData {
        visit_id,
        customer_id: "cust-100".to_string(),
        sales_rep_id: "rep-1".to_string(),
        contract: ContractData::default(),
        notes: None,
        metadata: Value::Null,
    }
}

/// Auto-save config with the reference timings; tests run under a paused
/// clock so real durations cost nothing.
pub fn autosave_config() -> AutoSaveConfig {
    AutoSaveConfig::default()
}

pub fn queue_config() -> SyncQueueConfig {
    SyncQueueConfig::default()
}

/// Let spawned tasks run to completion without advancing the clock
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
