//! # Oncekey
//!
//! At-most-once execution coordinator for keyed side-effecting operations.
//!
//! Oncekey guarantees that an operation identified by a caller-supplied
//! idempotency key runs at most once across retried, duplicated, or
//! concurrently racing callers. The first caller to claim a key executes;
//! everyone else replays the stored result or waits for the in-flight
//! executor to finish.
//!
//! ## Quick Start
//!
//! ```ignore
//! use oncekey::prelude::*;
//!
//! let service = Oncekey::open();
//! let shipments = service.typed::<Shipment>();
//!
//! let key = IdempotencyKey::new("order-123")?;
//! let outcome = shipments.execute(&key, Duration::from_secs(5), || {
//!     Ok(create_shipment(&order)?)
//! })?;
//!
//! match outcome {
//!     TypedExecution::Executed(shipment) => { /* this caller ran it */ }
//!     TypedExecution::Replayed(shipment) => { /* a duplicate; same result */ }
//!     TypedExecution::TimedOut => { /* executor still in flight */ }
//! }
//! ```
//!
//! ## Layers
//!
//! 1. **Raw** - [`IdempotencyCoordinator`] over opaque [`Payload`] bytes:
//!    `claim` / `complete` / `await_result`
//! 2. **Typed** - [`TypedCoordinator`] with serde round-trips at the
//!    boundary: the core stays type-agnostic
//! 3. **Service** - [`Oncekey`] owning the store lifecycle and TTL
//!    configuration via [`OncekeyBuilder`]

#![warn(missing_docs)]

mod service;
mod typed;

pub mod prelude;

// Re-export main entry points
pub use service::{Oncekey, OncekeyBuilder};
pub use typed::{TypedClaim, TypedCoordinator, TypedExecution};

// Re-export the coordination surface
pub use oncekey_coordinator::{Awaited, Claim, Completion, Execution, IdempotencyCoordinator};
pub use oncekey_core::{
    CoordinatorConfig, CreateOutcome, Error, IdempotencyKey, IdempotencyRecord, Payload,
    RecordStatus, RecordStore, Result, WriteOutcome,
};
pub use oncekey_store::MemoryStore;
