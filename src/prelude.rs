//! Convenient re-exports for common usage.
//!
//! ```ignore
//! use oncekey::prelude::*;
//! ```

pub use crate::{
    Awaited, Claim, Completion, CoordinatorConfig, Error, Execution, IdempotencyCoordinator,
    IdempotencyKey, MemoryStore, Oncekey, OncekeyBuilder, Payload, RecordStore, Result,
    TypedClaim, TypedCoordinator, TypedExecution,
};
pub use std::time::Duration;
