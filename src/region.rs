//! # Region Collaborators
//!
//! Boundaries the visit flow consumes for out-of-region handling: the region
//! check comparing the customer's district to the rep's assigned region, and
//! the approval request sent to a manager when they differ. Both are traits
//! so UI layers and tests can substitute doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::models::NewNotification;
use crate::persistence::{RemoteStore, RemoteStoreError};

/// Outcome of comparing a customer district against a rep's region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCheck {
    pub is_out_of_region: bool,
    pub customer_district: String,
    pub rep_region: Option<String>,
}

/// Pure query collaborator: does this customer district fall outside the
/// rep's assigned region?
#[async_trait]
pub trait RegionChecker: Send + Sync {
    async fn check_region(
        &self,
        customer_district: &str,
        rep_id: &str,
    ) -> Result<RegionCheck, RemoteStoreError>;
}

/// Region checker resolving the rep's region through the remote store.
///
/// Districts are compared after trimming and Unicode lowercasing so that
/// "Kadıköy" and "kadıköy " match. A rep without an assigned region is
/// treated as in-region; region enforcement only applies to assigned reps.
pub struct StoreRegionChecker {
    remote: Arc<dyn RemoteStore>,
}

impl StoreRegionChecker {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote }
    }
}

fn districts_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[async_trait]
impl RegionChecker for StoreRegionChecker {
    async fn check_region(
        &self,
        customer_district: &str,
        rep_id: &str,
    ) -> Result<RegionCheck, RemoteStoreError> {
        let rep_region = self.remote.rep_region(rep_id).await?;
        let is_out_of_region = match rep_region.as_deref() {
            Some(region) => !districts_match(customer_district, region),
            None => false,
        };
        Ok(RegionCheck {
            is_out_of_region,
            customer_district: customer_district.trim().to_string(),
            rep_region,
        })
    }
}

/// Payload for an out-of-region approval request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OorApprovalRequest {
    pub visit_id: Uuid,
    pub customer_id: String,
    pub customer_district: String,
    pub rep_region: Option<String>,
    pub requested_by: String,
}

/// Receipt for a fired approval request. Delivery guarantees end here: the
/// state machine only records that a request was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalReceipt {
    pub success: bool,
    pub notification_id: Option<String>,
}

/// Fire-and-forget collaborator for requesting managerial approval
#[async_trait]
pub trait ApprovalRequester: Send + Sync {
    async fn request_approval(
        &self,
        request: OorApprovalRequest,
    ) -> Result<ApprovalReceipt, RemoteStoreError>;
}

/// Approval requester that writes a manager-facing notification record
pub struct NotificationApprovalRequester {
    remote: Arc<dyn RemoteStore>,
}

impl NotificationApprovalRequester {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl ApprovalRequester for NotificationApprovalRequester {
    async fn request_approval(
        &self,
        request: OorApprovalRequest,
    ) -> Result<ApprovalReceipt, RemoteStoreError> {
        let notification = NewNotification {
            recipient_role: "manager".to_string(),
            subject: "Out-of-region visit approval needed".to_string(),
            body: format!(
                "Rep {} requests approval to visit customer {} in {}",
                request.requested_by, request.customer_id, request.customer_district
            ),
            metadata: json!({
                "visit_id": request.visit_id,
                "customer_district": request.customer_district,
                "rep_region": request.rep_region,
            }),
        };

        let notification_id = self.remote.create_notification(notification).await?;
        info!(
            visit_id = %request.visit_id,
            requested_by = %request.requested_by,
            notification_id = %notification_id,
            "Out-of-region approval requested"
        );

        Ok(ApprovalReceipt {
            success: true,
            notification_id: Some(notification_id),
        })
    }
}
