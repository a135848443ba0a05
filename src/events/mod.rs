//! # Event System
//!
//! Broadcast channel for lifecycle/status events emitted by the draft
//! auto-saver and the offline sync queue. Event names live in
//! [`crate::constants::events`].

pub mod publisher;

pub use publisher::{EventPublisher, PublishedEvent};
