//! # Remote Persistence
//!
//! Trait boundary for the hosted backend plus the Postgres implementation.
//! All reads and writes pass through [`RemoteStore`]; the core never owns the
//! schema, only the record collections it touches.

pub mod remote;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use remote::{RemoteStore, RemoteStoreError};

#[cfg(feature = "postgres")]
pub use postgres::PgRemoteStore;
