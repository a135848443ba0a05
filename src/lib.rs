#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Visitflow Core
//!
//! Rust core for field-sales (door-to-door energy sales) visit orchestration.
//!
//! ## Overview
//!
//! Agents run a multi-step visit/contract flow at the door: customer
//! confirmation, identity verification, contract acceptance with e-signature
//! and SMS confirmation, then outcome capture. This crate implements the
//! three pieces of that flow that live below the UI:
//!
//! - **Visit flow state machine**: sequences a visit through its fixed
//!   stages with pure guard predicates and silent-reject semantics, so the
//!   same predicates back both button enablement and transition legality.
//! - **Draft auto-save**: debounced persistence of in-progress contract
//!   data with change detection, linear-backoff retry, and an always-visible
//!   save status.
//! - **Offline sync queue**: durable, strictly-ordered replay of
//!   state-changing writes across connectivity loss and process restarts.
//!
//! The hosted relational backend is an external collaborator reached through
//! the [`persistence::RemoteStore`] trait; the schema is not owned here.
//!
//! ## Module Organization
//!
//! - [`state_machine`] - Visit stages, events, guards, and dispatch
//! - [`autosave`] - Debounced draft persistence with bounded retry
//! - [`sync_queue`] - Offline operation queue and its durable mirror
//! - [`persistence`] - Remote store trait and Postgres implementation
//! - [`region`] - Region-check and approval-request collaborators
//! - [`models`] - Domain data types
//! - [`events`] - Lifecycle event broadcasting
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use visitflow_core::autosave::DraftAutoSaver;
//! use visitflow_core::config::VisitCoreConfig;
//! use visitflow_core::events::EventPublisher;
//! use visitflow_core::state_machine::{VisitEvent, VisitStateMachine};
//! use visitflow_core::test_helpers::InMemoryRemoteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = VisitCoreConfig::load()?;
//! let remote = Arc::new(InMemoryRemoteStore::new());
//! let events = EventPublisher::default();
//!
//! let mut machine = VisitStateMachine::new("rep-42");
//! machine.dispatch(VisitEvent::StartVisit);
//!
//! let saver = DraftAutoSaver::new(remote, config.autosave, events);
//! println!("save status: {}", saver.status());
//! # Ok(())
//! # }
//! ```

pub mod autosave;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod region;
pub mod state_machine;
pub mod sync_queue;
pub mod test_helpers;

pub use autosave::{AutoSaveError, DraftAutoSaver, SaveStatus};
pub use config::{AutoSaveConfig, DatabaseConfig, SyncQueueConfig, VisitCoreConfig};
pub use error::{Result, VisitCoreError};
pub use events::EventPublisher;
pub use models::{
    ContractDraft, CustomerSnapshot, CustomerType, DraftData, QueuedOperation, VisitOutcome,
    VisitSession,
};
pub use persistence::{RemoteStore, RemoteStoreError};
pub use region::{ApprovalRequester, RegionCheck, RegionChecker};
pub use state_machine::{VisitEvent, VisitStage, VisitStateMachine};
pub use sync_queue::{DrainReport, OfflineQueue};
