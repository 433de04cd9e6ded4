//! Idempotency coordination for Oncekey
//!
//! This crate implements the coordinator state machine:
//! - `claim`: atomically become the exclusive executor, replay a stored
//!   result, or learn another executor is in flight
//! - `complete`: attach the write-once result and release waiters
//! - `await_result`: block until a racing executor completes or a
//!   deadline passes
//! - `execute`: the claim/run/complete/await cycle as one call

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;

pub use coordinator::{Awaited, Claim, Completion, Execution, IdempotencyCoordinator};
