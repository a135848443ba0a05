use tracing::{debug, info, trace};
use uuid::Uuid;

use super::events::VisitEvent;
use super::guards::{CustomerConfirmedGuard, FinalizeReadyGuard, KycCompleteGuard, StageGuard};
use super::states::VisitStage;
use crate::models::VisitSession;

/// Visit flow state machine enforcing the legal sequence of a visit.
///
/// The machine is explicitly constructed and owned by the caller, with no
/// ambient store, and its lifetime equals the visit session's. Dispatch is pure and
/// synchronous: a rejected event leaves the session unchanged and the stage
/// is simply returned as-is. There is no error channel for rejections;
/// callers that need the reason check the [`StageGuard`] predicates directly,
/// the same predicates dispatch itself evaluates.
pub struct VisitStateMachine {
    session: VisitSession,
}

impl VisitStateMachine {
    /// Create a new machine in the setup stage for the given rep
    pub fn new(sales_rep_id: impl Into<String>) -> Self {
        Self {
            session: VisitSession::new(sales_rep_id),
        }
    }

    /// Resume a machine from an existing session (crash / draft recovery)
    pub fn from_session(session: VisitSession) -> Self {
        Self { session }
    }

    /// Get the accumulated session state
    pub fn session(&self) -> &VisitSession {
        &self.session
    }

    /// Consume the machine, handing the session back to the caller
    pub fn into_session(self) -> VisitSession {
        self.session
    }

    /// Get the current stage
    pub fn stage(&self) -> VisitStage {
        self.session.stage
    }

    /// Check if the visit has been finalized
    pub fn is_terminal(&self) -> bool {
        self.session.stage.is_terminal()
    }

    /// Apply an event, returning the (possibly unchanged) stage.
    ///
    /// Guard failures and events that do not match the current stage are
    /// silent no-ops.
    pub fn dispatch(&mut self, event: VisitEvent) -> VisitStage {
        if self.session.stage.is_terminal() {
            trace!(
                event = event.event_type(),
                "Visit already finalized, event ignored"
            );
            return self.session.stage;
        }

        let event_type = event.event_type();
        match (self.session.stage, event) {
            (VisitStage::Setup, VisitEvent::StartVisit) => {
                let visit_id = Uuid::new_v4();
                self.session.visit_id = Some(visit_id);
                info!(visit_id = %visit_id, sales_rep_id = %self.session.sales_rep_id, "Visit started");
                self.transition_to(VisitStage::Customer, event_type);
            }

            (VisitStage::Customer, VisitEvent::SetCustomer { snapshot, region }) => {
                self.session.oor.is_out_of_region = region.is_out_of_region;
                self.session.oor.customer_district = Some(region.customer_district);
                self.session.oor.rep_region = region.rep_region;
                if region.is_out_of_region {
                    info!(
                        customer_id = %snapshot.customer_id,
                        district = %snapshot.district,
                        rep_region = self.session.oor.rep_region.as_deref().unwrap_or("unassigned"),
                        "Customer is out of the rep's region, approval required"
                    );
                }
                self.session.customer = Some(snapshot);
            }

            (VisitStage::Customer, VisitEvent::OorApprovalRequested { requested_by }) => {
                self.session.oor.approval_requested = true;
                self.session.oor.requested_by = Some(requested_by);
            }

            (VisitStage::Customer, VisitEvent::OorApproved { approved_by }) => {
                self.session.oor.approval_granted = true;
                self.session.oor.approved_by = Some(approved_by);
                self.transition_to(VisitStage::Kyc, event_type);
            }

            (VisitStage::Customer, VisitEvent::ConfirmCustomer) => {
                self.guarded_transition(&CustomerConfirmedGuard, VisitStage::Kyc, event_type);
            }

            (VisitStage::Kyc, VisitEvent::SetKyc(update)) => {
                self.session.kyc.apply(update);
            }

            (VisitStage::Kyc, VisitEvent::KycOk) => {
                self.guarded_transition(&KycCompleteGuard, VisitStage::Contract, event_type);
            }

            (VisitStage::Contract, VisitEvent::SetContract(update)) => {
                self.session.contract.apply(update);
            }

            (VisitStage::Contract, VisitEvent::ProceedToResult) => {
                self.transition_to(VisitStage::Result, event_type);
            }

            (VisitStage::Result, VisitEvent::SetResult(update)) => {
                self.session.result.apply(update);
            }

            (VisitStage::Result, VisitEvent::Finalize) => {
                self.guarded_transition(&FinalizeReadyGuard, VisitStage::Done, event_type);
            }

            (from, VisitEvent::BackTo(target)) => {
                // Back-navigation only to an already-visited, non-setup stage
                if target.order_index() < from.order_index()
                    && target != VisitStage::Setup
                    && !target.is_terminal()
                {
                    self.transition_to(target, event_type);
                } else {
                    trace!(from = %from, target = %target, "Back-navigation rejected");
                }
            }

            (from, _) => {
                trace!(stage = %from, event = event_type, "Event not applicable in current stage");
            }
        }

        self.session.stage
    }

    fn guarded_transition(&mut self, guard: &dyn StageGuard, to: VisitStage, event: &'static str) {
        if guard.check(&self.session) {
            self.transition_to(to, event);
        } else {
            debug!(
                stage = %self.session.stage,
                event = event,
                guard = guard.description(),
                "Guard rejected transition"
            );
        }
    }

    fn transition_to(&mut self, to: VisitStage, event: &'static str) {
        let from = self.session.stage;
        self.session.stage = to;
        info!(
            visit_id = self.session.visit_id.map(|id| id.to_string()).unwrap_or_default(),
            from = %from,
            to = %to,
            event = event,
            "Visit stage transition"
        );
    }
}
