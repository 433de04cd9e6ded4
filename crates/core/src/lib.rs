//! Core types for the Oncekey idempotency coordinator
//!
//! This crate defines the shared vocabulary of the workspace:
//! - `IdempotencyKey` and `Payload`: validated key and opaque result bytes
//! - `IdempotencyRecord`: the per-key coordination record and its lifecycle
//! - `RecordStore`: the narrow trait the coordinator consumes from a
//!   backing key-value store (atomic create-if-absent, read, write-once
//!   result, completion notification)
//! - `Error`: the canonical error taxonomy
//! - `CoordinatorConfig`: TTL and claim-expiry configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod record;
pub mod traits;
pub mod types;

pub use config::CoordinatorConfig;
pub use error::{Error, Result};
pub use record::{IdempotencyRecord, RecordStatus};
pub use traits::{CreateOutcome, RecordStore, WriteOutcome};
pub use types::{now_millis, IdempotencyKey, Payload};
