//! # Offline Sync Queue
//!
//! Makes state-changing operations resilient to connectivity loss: writes
//! queue locally (mirrored to a durable store), then replay serially against
//! the remote store when connectivity returns. Offline is a first-class
//! state, not an error.

pub mod queue;
pub mod store;

pub use queue::{DrainReport, OfflineQueue, QueueError};
pub use store::{DurableQueueStore, DurableStoreError, InMemoryQueueStore, JsonFileQueueStore};
