//! # Draft Auto-Save
//!
//! Debounced persistence of in-progress contract drafts: change detection
//! against the last saved serialization, create-then-update against the
//! remote store, linear-backoff retry with classification-aware early exit,
//! and an always-observable save status.

pub mod saver;

pub use saver::{AutoSaveError, DraftAutoSaver, SaveStatus};
