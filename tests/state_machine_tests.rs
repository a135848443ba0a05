//! Integration tests for the visit flow state machine: guard behavior,
//! silent-reject semantics, and the end-to-end region scenarios.

mod common;

use std::sync::Arc;
use uuid::Uuid;

use common::{individual_customer, organizational_customer};
use visitflow_core::models::{
    ContractUpdate, CustomerSnapshot, KycUpdate, ResultUpdate, VisitOutcome, VisitSession,
};
use visitflow_core::region::{RegionCheck, RegionChecker, StoreRegionChecker};
use visitflow_core::state_machine::{
    FinalizeReadyGuard, KycCompleteGuard, StageGuard, VisitEvent, VisitStage, VisitStateMachine,
};
use visitflow_core::test_helpers::InMemoryRemoteStore;

fn set_customer_event(snapshot: CustomerSnapshot, region: RegionCheck) -> VisitEvent {
    VisitEvent::SetCustomer { snapshot, region }
}

fn in_region_check(district: &str) -> RegionCheck {
    RegionCheck {
        is_out_of_region: false,
        customer_district: district.to_string(),
        rep_region: Some(district.to_string()),
    }
}

/// Build a session parked at the result stage with the given guard drivers
fn result_stage_session(
    contract_accepted: bool,
    sms_verified: bool,
    status_set: bool,
    out_of_region: bool,
    approval_granted: bool,
) -> VisitSession {
    let mut session = VisitSession::new("rep-1");
    session.visit_id = Some(Uuid::new_v4());
    session.stage = VisitStage::Result;
    session.customer = Some(individual_customer("Kadıköy"));
    session.contract.contract_accepted = contract_accepted;
    session.contract.sms_verified = sms_verified;
    if status_set {
        session.result.status = Some(VisitOutcome::Completed);
    }
    session.oor.is_out_of_region = out_of_region;
    session.oor.approval_granted = approval_granted;
    session
}

#[tokio::test]
async fn scenario_in_region_individual_unlocks_contract_with_consent_and_sms() {
    // Rep assigned to Kadıköy visiting a Kadıköy customer
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.set_rep_region("rep-1", "Kadıköy");
    let checker = StoreRegionChecker::new(remote);

    let region = checker.check_region("Kadıköy", "rep-1").await.unwrap();
    assert!(!region.is_out_of_region);

    let mut machine = VisitStateMachine::new("rep-1");
    machine.dispatch(VisitEvent::StartVisit);
    machine.dispatch(set_customer_event(individual_customer("Kadıköy"), region));
    assert!(!machine.session().oor.is_out_of_region);
    assert_eq!(machine.dispatch(VisitEvent::ConfirmCustomer), VisitStage::Kyc);

    // Individual KYC needs exactly consent + SMS verification
    machine.dispatch(VisitEvent::SetKyc(KycUpdate {
        kvkk_accepted: Some(true),
        ..Default::default()
    }));
    assert_eq!(machine.dispatch(VisitEvent::KycOk), VisitStage::Kyc);

    machine.dispatch(VisitEvent::SetKyc(KycUpdate {
        sms_verified: Some(true),
        ..Default::default()
    }));
    assert_eq!(machine.dispatch(VisitEvent::KycOk), VisitStage::Contract);
}

#[tokio::test]
async fn scenario_out_of_region_blocks_finalize_until_approved() {
    // Istanbul rep visiting an Ankara customer
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.set_rep_region("rep-1", "Istanbul");
    let checker = StoreRegionChecker::new(remote);

    let region = checker.check_region("Ankara", "rep-1").await.unwrap();
    assert!(region.is_out_of_region);
    assert_eq!(region.rep_region.as_deref(), Some("Istanbul"));

    let mut machine = VisitStateMachine::new("rep-1");
    machine.dispatch(VisitEvent::StartVisit);
    machine.dispatch(set_customer_event(individual_customer("Ankara"), region));
    assert!(machine.session().oor.is_out_of_region);

    // Plain confirmation is refused while unapproved; the machine stays put
    assert_eq!(
        machine.dispatch(VisitEvent::ConfirmCustomer),
        VisitStage::Customer
    );

    machine.dispatch(VisitEvent::OorApprovalRequested {
        requested_by: "rep-1".to_string(),
    });
    assert!(machine.session().oor.approval_requested);
    assert_eq!(machine.stage(), VisitStage::Customer);

    // Finalize with every other guard satisfied still refuses while unapproved
    let mut blocked = VisitStateMachine::from_session(result_stage_session(
        true, true, true, true, false,
    ));
    assert_eq!(blocked.dispatch(VisitEvent::Finalize), VisitStage::Result);

    // Approval unlocks both the customer stage and finalize
    assert_eq!(
        machine.dispatch(VisitEvent::OorApproved {
            approved_by: "mgr-9".to_string(),
        }),
        VisitStage::Kyc
    );
    assert!(machine.session().oor.approval_granted);

    let mut approved = VisitStateMachine::from_session(result_stage_session(
        true, true, true, true, true,
    ));
    assert_eq!(approved.dispatch(VisitEvent::Finalize), VisitStage::Done);
}

#[test]
fn scenario_organizational_customer_missing_phone_is_noop() {
    let mut machine = VisitStateMachine::new("rep-1");
    machine.dispatch(VisitEvent::StartVisit);
    machine.dispatch(set_customer_event(
        organizational_customer("Kadıköy"),
        in_region_check("Kadıköy"),
    ));
    machine.dispatch(VisitEvent::ConfirmCustomer);

    machine.dispatch(VisitEvent::SetKyc(KycUpdate {
        representative_name: Some("Ayşe Yılmaz".to_string()),
        representative_consent: Some(true),
        ..Default::default()
    }));

    let before = machine.session().clone();
    assert_eq!(machine.dispatch(VisitEvent::KycOk), VisitStage::Kyc);
    assert_eq!(machine.session(), &before, "rejected dispatch must not touch the session");

    machine.dispatch(VisitEvent::SetKyc(KycUpdate {
        representative_phone: Some("+90 555 000 0000".to_string()),
        ..Default::default()
    }));
    assert_eq!(machine.dispatch(VisitEvent::KycOk), VisitStage::Contract);
}

#[test]
fn finalize_guard_holds_for_every_driver_combination() {
    for bits in 0..16u8 {
        let contract_accepted = bits & 1 != 0;
        let sms_verified = bits & 2 != 0;
        let status_set = bits & 4 != 0;
        let out_of_region = bits & 8 != 0;

        let session = result_stage_session(
            contract_accepted,
            sms_verified,
            status_set,
            out_of_region,
            false,
        );
        let expected = contract_accepted && sms_verified && status_set && !out_of_region;

        assert_eq!(
            FinalizeReadyGuard.check(&session),
            expected,
            "guard mismatch for bits {bits:04b}"
        );

        let mut machine = VisitStateMachine::from_session(session.clone());
        let stage = machine.dispatch(VisitEvent::Finalize);
        if expected {
            assert_eq!(stage, VisitStage::Done);
        } else {
            assert_eq!(stage, VisitStage::Result);
            assert_eq!(machine.session(), &session);
        }
    }

    // The out-of-region half with approval granted behaves like in-region
    let session = result_stage_session(true, true, true, true, true);
    assert!(FinalizeReadyGuard.check(&session));
}

#[test]
fn kyc_rejection_leaves_session_byte_for_byte_unchanged() {
    let combos = [(false, false), (true, false), (false, true)];
    for (kvkk, sms) in combos {
        let mut machine = VisitStateMachine::new("rep-1");
        machine.dispatch(VisitEvent::StartVisit);
        machine.dispatch(set_customer_event(
            individual_customer("Kadıköy"),
            in_region_check("Kadıköy"),
        ));
        machine.dispatch(VisitEvent::ConfirmCustomer);
        machine.dispatch(VisitEvent::SetKyc(KycUpdate {
            kvkk_accepted: Some(kvkk),
            sms_verified: Some(sms),
            ..Default::default()
        }));

        let before = serde_json::to_vec(machine.session()).unwrap();
        machine.dispatch(VisitEvent::KycOk);
        let after = serde_json::to_vec(machine.session()).unwrap();
        assert_eq!(before, after, "kvkk={kvkk} sms={sms}");
    }
}

#[test]
fn result_merges_accumulate_before_finalize() {
    let mut machine =
        VisitStateMachine::from_session(result_stage_session(true, true, false, false, false));

    machine.dispatch(VisitEvent::SetResult(ResultUpdate {
        status: Some(VisitOutcome::Completed),
        notes: Some("Signed a 12-month plan".to_string()),
        revenue: Some(1450.0),
    }));
    assert_eq!(machine.stage(), VisitStage::Result);

    assert_eq!(machine.dispatch(VisitEvent::Finalize), VisitStage::Done);
    let session = machine.session();
    assert_eq!(session.result.status, Some(VisitOutcome::Completed));
    assert_eq!(session.result.revenue, Some(1450.0));
}

#[test]
fn contract_merge_does_not_advance_stage() {
    let mut session = VisitSession::new("rep-1");
    session.visit_id = Some(Uuid::new_v4());
    session.stage = VisitStage::Contract;
    session.customer = Some(individual_customer("Kadıköy"));
    let mut machine = VisitStateMachine::from_session(session);

    machine.dispatch(VisitEvent::SetContract(ContractUpdate {
        contract_accepted: Some(true),
        signature_ref: Some("sig/visit.png".to_string()),
        sms_sent: Some(true),
        sms_verified: Some(true),
        ..Default::default()
    }));
    assert_eq!(machine.stage(), VisitStage::Contract);
    assert!(machine.session().contract.contract_accepted);

    assert_eq!(
        machine.dispatch(VisitEvent::ProceedToResult),
        VisitStage::Result
    );
}

mod guard_invariance {
    use super::*;
    use proptest::prelude::*;

    fn kyc_session_strategy() -> impl Strategy<Value = VisitSession> {
        (
            any::<bool>(),
            any::<bool>(),
            proptest::option::of("[a-zA-Z ]{0,12}"),
            proptest::option::of("[0-9+ ]{0,14}"),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(
                |(kvkk, sms, rep_name, rep_phone, rep_consent, organizational)| {
                    let mut session = VisitSession::new("rep-1");
                    session.visit_id = Some(Uuid::new_v4());
                    session.stage = VisitStage::Kyc;
                    session.customer = Some(if organizational {
                        organizational_customer("Kadıköy")
                    } else {
                        individual_customer("Kadıköy")
                    });
                    session.kyc.kvkk_accepted = kvkk;
                    session.kyc.sms_verified = sms;
                    session.kyc.representative_name = rep_name;
                    session.kyc.representative_phone = rep_phone;
                    session.kyc.representative_consent = rep_consent;
                    session
                },
            )
    }

    proptest! {
        /// KycOk advances exactly when the guard holds; otherwise the session
        /// is untouched.
        #[test]
        fn kyc_ok_matches_guard(session in kyc_session_strategy()) {
            let guard_holds = KycCompleteGuard.check(&session);
            let mut machine = VisitStateMachine::from_session(session.clone());
            let stage = machine.dispatch(VisitEvent::KycOk);

            if guard_holds {
                prop_assert_eq!(stage, VisitStage::Contract);
            } else {
                prop_assert_eq!(stage, VisitStage::Kyc);
                prop_assert_eq!(machine.session(), &session);
            }
        }
    }
}
