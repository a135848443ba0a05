//! Integration tests for the offline sync queue: durability across a
//! simulated restart, strict drain ordering, stuck-operation surfacing, and
//! connectivity transitions.

mod common;

use std::sync::Arc;
use serde_json::json;

use common::{individual_customer, queue_config, settle};
use visitflow_core::events::EventPublisher;
use visitflow_core::models::{
    ContractUpdate, FinalizedVisit, KycUpdate, OperationType, ResultUpdate, VisitOutcome,
};
use visitflow_core::region::RegionCheck;
use visitflow_core::state_machine::{VisitEvent, VisitStage, VisitStateMachine};
use visitflow_core::sync_queue::{DurableQueueStore, InMemoryQueueStore, OfflineQueue};
use visitflow_core::test_helpers::InMemoryRemoteStore;

async fn offline_queue(
    remote: Arc<InMemoryRemoteStore>,
    durable: Arc<InMemoryQueueStore>,
) -> OfflineQueue {
    let queue = OfflineQueue::new(remote, durable, queue_config(), EventPublisher::default())
        .await
        .unwrap();
    queue.set_online(false);
    queue
}

#[tokio::test(start_paused = true)]
async fn operations_survive_restart_and_sync_exactly_once() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let durable = Arc::new(InMemoryQueueStore::new());

    // First process: three writes while offline, then a crash
    let first = offline_queue(remote.clone(), durable.clone()).await;
    let a = first.add_to_queue(OperationType::SaveDraft, json!({"n": 1})).await.unwrap();
    let b = first.add_to_queue(OperationType::AppendAudit, json!({"n": 2})).await.unwrap();
    let c = first.add_to_queue(OperationType::FinalizeVisit, json!({"n": 3})).await.unwrap();
    assert_eq!(first.pending_count(), 3);
    assert!(remote.applied_operations().is_empty());
    drop(first);

    // Restart: rehydrate from the durable mirror, then connectivity returns
    let second = OfflineQueue::new(
        remote.clone(),
        durable.clone(),
        queue_config(),
        EventPublisher::default(),
    )
    .await
    .unwrap();
    assert_eq!(second.pending_count(), 3);

    let report = second.manual_sync().await;
    assert_eq!(report.synced, 3);
    assert_eq!(remote.applied_operations(), vec![a, b, c]);
    assert_eq!(second.pending_count(), 0);
    assert!(durable.get_all().await.unwrap().is_empty());

    // A second pass finds nothing: no duplicate sync
    let report = second.manual_sync().await;
    assert_eq!(report.attempted, 0);
    assert_eq!(remote.applied_operations().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn failed_operation_keeps_its_turn_and_retries_next_pass() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let durable = Arc::new(InMemoryQueueStore::new());
    let queue = offline_queue(remote.clone(), durable.clone()).await;

    let a = queue.add_to_queue(OperationType::SaveDraft, json!({"op": "a"})).await.unwrap();
    let b = queue.add_to_queue(OperationType::SaveDraft, json!({"op": "b"})).await.unwrap();
    let c = queue.add_to_queue(OperationType::SaveDraft, json!({"op": "c"})).await.unwrap();
    remote.fail_operation(b, 1);

    queue.set_online(true);
    let first_pass = queue.manual_sync().await;
    assert_eq!(first_pass.attempted, 3);
    assert_eq!(first_pass.synced, 2);
    assert_eq!(first_pass.failed, 1);

    // B failed in place; C was still attempted in the same pass
    assert_eq!(remote.attempt_log(), vec![a, b, c]);
    assert_eq!(queue.pending_count(), 1);

    let second_pass = queue.manual_sync().await;
    assert_eq!(second_pass.synced, 1);
    assert_eq!(remote.attempt_log(), vec![a, b, c, b]);
    assert_eq!(remote.applied_operations(), vec![a, c, b]);
    assert_eq!(queue.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn stuck_operations_stay_visible_and_keep_being_attempted() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let durable = Arc::new(InMemoryQueueStore::new());
    let queue = offline_queue(remote.clone(), durable.clone()).await;

    let wedged = queue.add_to_queue(OperationType::SaveDraft, json!({})).await.unwrap();
    remote.fail_operation(wedged, 99);
    queue.set_online(true);

    // Passes 1 and 2 burn the budget quietly
    assert_eq!(queue.manual_sync().await.newly_stuck, 0);
    assert_eq!(queue.manual_sync().await.newly_stuck, 0);
    assert_eq!(queue.stuck_count(), 0);

    // Pass 3 crosses the cap: reported stuck, never dropped
    let third = queue.manual_sync().await;
    assert_eq!(third.newly_stuck, 1);
    assert_eq!(queue.stuck_count(), 1);
    assert_eq!(queue.pending_count(), 1);

    // Still attempted on later passes, but only announced once
    let fourth = queue.manual_sync().await;
    assert_eq!(fourth.attempted, 1);
    assert_eq!(fourth.newly_stuck, 0);
    assert_eq!(remote.attempt_log().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn permanent_rejection_saturates_the_retry_budget_immediately() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let durable = Arc::new(InMemoryQueueStore::new());
    let queue = offline_queue(remote.clone(), durable.clone()).await;

    let rejected = queue.add_to_queue(OperationType::SaveDraft, json!({})).await.unwrap();
    remote.fail_operation_permanently(rejected);
    queue.set_online(true);

    let report = queue.manual_sync().await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.newly_stuck, 1, "validation errors skip straight to stuck");
    assert_eq!(queue.stuck_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn discard_removes_a_stuck_operation_everywhere() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let durable = Arc::new(InMemoryQueueStore::new());
    let queue = offline_queue(remote.clone(), durable.clone()).await;

    let wedged = queue.add_to_queue(OperationType::SaveDraft, json!({})).await.unwrap();
    remote.fail_operation_permanently(wedged);
    queue.set_online(true);
    queue.manual_sync().await;
    assert_eq!(queue.stuck_count(), 1);

    assert!(queue.discard(wedged).await.unwrap());
    assert_eq!(queue.pending_count(), 0);
    assert!(durable.get_all().await.unwrap().is_empty());
    assert!(!queue.discard(wedged).await.unwrap(), "second discard is a no-op");
}

#[tokio::test(start_paused = true)]
async fn adding_while_online_drains_immediately() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let durable = Arc::new(InMemoryQueueStore::new());
    let queue = OfflineQueue::new(
        remote.clone(),
        durable.clone(),
        queue_config(),
        EventPublisher::default(),
    )
    .await
    .unwrap();

    let op = queue.add_to_queue(OperationType::SaveDraft, json!({})).await.unwrap();
    settle().await;

    assert_eq!(remote.applied_operations(), vec![op]);
    assert_eq!(queue.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn going_offline_defers_draining_without_failing_anything() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let durable = Arc::new(InMemoryQueueStore::new());
    let queue = offline_queue(remote.clone(), durable.clone()).await;

    queue.add_to_queue(OperationType::SaveDraft, json!({})).await.unwrap();
    settle().await;
    assert!(remote.attempt_log().is_empty(), "no sync attempts while offline");

    let report = queue.manual_sync().await;
    assert_eq!(report.attempted, 0, "manual sync also defers while offline");
    assert_eq!(queue.pending_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn drain_progress_events_carry_current_and_total() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let durable = Arc::new(InMemoryQueueStore::new());
    let events = EventPublisher::new(64);
    let mut rx = events.subscribe();

    let queue = OfflineQueue::new(remote, durable, queue_config(), events)
        .await
        .unwrap();
    queue.set_online(false);
    queue.add_to_queue(OperationType::SaveDraft, json!({})).await.unwrap();
    queue.add_to_queue(OperationType::SaveDraft, json!({})).await.unwrap();
    queue.set_online(true);
    queue.manual_sync().await;

    let mut progress = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if event.name == "queue.drain_progress" {
            progress.push((event.context["current"].clone(), event.context["total"].clone()));
        }
    }
    assert_eq!(progress, vec![(json!(1), json!(2)), (json!(2), json!(2))]);
}

/// Closing a visit while offline: the finalized record is queued, survives a
/// restart, and lands exactly once when connectivity returns.
#[tokio::test(start_paused = true)]
async fn finalize_offline_then_sync_on_reconnect() {
    let mut machine = VisitStateMachine::new("rep-1");
    machine.dispatch(VisitEvent::StartVisit);
    machine.dispatch(VisitEvent::SetCustomer {
        snapshot: individual_customer("Kadıköy"),
        region: RegionCheck {
            is_out_of_region: false,
            customer_district: "Kadıköy".to_string(),
            rep_region: Some("Kadıköy".to_string()),
        },
    });
    machine.dispatch(VisitEvent::ConfirmCustomer);
    machine.dispatch(VisitEvent::SetKyc(KycUpdate {
        kvkk_accepted: Some(true),
        sms_verified: Some(true),
        ..Default::default()
    }));
    machine.dispatch(VisitEvent::KycOk);
    machine.dispatch(VisitEvent::SetContract(ContractUpdate {
        contract_accepted: Some(true),
        sms_verified: Some(true),
        ..Default::default()
    }));
    machine.dispatch(VisitEvent::ProceedToResult);
    machine.dispatch(VisitEvent::SetResult(ResultUpdate {
        status: Some(VisitOutcome::Completed),
        revenue: Some(980.0),
        ..Default::default()
    }));
    assert_eq!(machine.dispatch(VisitEvent::Finalize), VisitStage::Done);

    let finalized = FinalizedVisit::from_session(machine.session()).unwrap();

    let remote = Arc::new(InMemoryRemoteStore::new());
    let durable = Arc::new(InMemoryQueueStore::new());
    let queue = offline_queue(remote.clone(), durable.clone()).await;
    let op = queue
        .add_to_queue(
            OperationType::FinalizeVisit,
            serde_json::to_value(&finalized).unwrap(),
        )
        .await
        .unwrap();
    drop(queue);

    let resumed = OfflineQueue::new(
        remote.clone(),
        durable,
        queue_config(),
        EventPublisher::default(),
    )
    .await
    .unwrap();
    let report = resumed.manual_sync().await;
    assert_eq!(report.synced, 1);
    assert_eq!(remote.applied_operations(), vec![op]);
}
