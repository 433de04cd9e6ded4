//! The backing-store interface.
//!
//! The coordinator consumes exactly four primitives from its store:
//! atomic create-if-absent, point read, write-once result, and a
//! completion-notification wait. Anything that offers these with the
//! stated atomicity can back a coordinator; correctness never depends on
//! coordinator-side locking, so any number of coordinator instances may
//! share one store.

use crate::error::Result;
use crate::record::IdempotencyRecord;
use crate::types::{IdempotencyKey, Payload};
use std::time::Duration;

/// Outcome of an atomic create-if-absent.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// The key was absent (or its record expired/reclaimable); a fresh
    /// `Pending` record now exists and the caller is the exclusive
    /// executor.
    Created,
    /// A live record already exists; snapshot attached.
    Existing(IdempotencyRecord),
}

/// Outcome of a write-once result write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// `Pending` transitioned to `Completed`; waiters were released.
    Stored,
    /// The record was already `Completed`. No-op; the original result is
    /// retained.
    AlreadyCompleted,
    /// The record had vanished (TTL expiry or external deletion). A fresh
    /// `Completed` record was seeded so later claims still replay, but
    /// replay integrity for the missing interval is not guaranteed.
    Seeded,
}

/// Atomic record store backing one or more coordinators.
///
/// # Atomicity contract
///
/// `create_if_absent` and `write_result` must each be a single atomic
/// step against the store: two racing creates for one key must yield
/// exactly one `Created`, and two racing writes exactly one `Stored`.
/// Failures surface as [`Error::StoreUnavailable`] and must never leave a
/// partial record behind.
///
/// [`Error::StoreUnavailable`]: crate::error::Error::StoreUnavailable
pub trait RecordStore: Send + Sync {
    /// Atomically claim `key` by installing a fresh `Pending` record if
    /// no live record exists.
    fn create_if_absent(&self, key: &IdempotencyKey) -> Result<CreateOutcome>;

    /// Read the live record for `key`. Expired records read as `None`.
    fn read(&self, key: &IdempotencyKey) -> Result<Option<IdempotencyRecord>>;

    /// Atomically store the write-once result for `key` and release any
    /// waiters.
    fn write_result(&self, key: &IdempotencyKey, result: Payload) -> Result<WriteOutcome>;

    /// Block until `key` completes or `timeout` elapses.
    ///
    /// Returns the stored payload on completion, `None` on timeout. The
    /// implementation must not miss a completion that lands between the
    /// caller's last read and the start of the wait.
    fn await_result(&self, key: &IdempotencyKey, timeout: Duration) -> Result<Option<Payload>>;

    /// Remove expired records. Returns the number removed.
    ///
    /// Housekeeping only; reads already treat expired records as absent.
    fn purge_expired(&self) -> Result<usize>;
}
