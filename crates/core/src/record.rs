//! The per-key coordination record.
//!
//! Each idempotency key maps to at most one `IdempotencyRecord`. The record
//! moves through a fixed lifecycle:
//!
//! ```text
//! absent --claim--> Pending --complete--> Completed --TTL--> absent
//! ```
//!
//! Invariants:
//! - `Pending` records carry no result
//! - `Completed` records always carry a result, and the result is
//!   write-once for the remaining record lifetime
//! - Only the store mutates records; callers go through claim/complete

use crate::types::{IdempotencyKey, Payload};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status of a coordination record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Claimed; the executor is in flight and no result exists yet.
    Pending,
    /// Execution finished; the stored result replays to all later callers.
    Completed,
}

/// One coordination record per idempotency key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    /// The caller-supplied key this record coordinates.
    pub key: IdempotencyKey,
    /// Current lifecycle status.
    pub status: RecordStatus,
    /// Stored result; `Some` iff status is `Completed`.
    pub result: Option<Payload>,
    /// Creation time in epoch milliseconds. Drives record TTL.
    pub created_at: i64,
    /// Time of the most recent claim in epoch milliseconds.
    ///
    /// Distinct from `created_at` after a claim takeover; drives the
    /// claim-expiry policy for crashed executors.
    pub claimed_at: i64,
}

impl IdempotencyRecord {
    /// Create a fresh `Pending` record claimed at `now`.
    pub fn pending(key: IdempotencyKey, now: i64) -> Self {
        Self {
            key,
            status: RecordStatus::Pending,
            result: None,
            created_at: now,
            claimed_at: now,
        }
    }

    /// Create a `Completed` record seeded at `now`.
    ///
    /// Used when a completion arrives for a vanished record: the fresh
    /// record lets later claims replay even though the original claim
    /// interval was lost.
    pub fn completed(key: IdempotencyKey, result: Payload, now: i64) -> Self {
        Self {
            key,
            status: RecordStatus::Completed,
            result: Some(result),
            created_at: now,
            claimed_at: now,
        }
    }

    /// Transition `Pending` to `Completed` with the given result.
    ///
    /// Caller must have checked the status; completing an already
    /// completed record would violate the write-once invariant.
    pub fn complete(&mut self, result: Payload) {
        debug_assert_eq!(self.status, RecordStatus::Pending);
        self.status = RecordStatus::Completed;
        self.result = Some(result);
    }

    /// Whether this record is pending.
    pub fn is_pending(&self) -> bool {
        self.status == RecordStatus::Pending
    }

    /// Whether this record is completed.
    pub fn is_completed(&self) -> bool {
        self.status == RecordStatus::Completed
    }

    /// Whether the record's lifetime has elapsed at `now`.
    ///
    /// An expired record reads as absent; the next claim starts a fresh
    /// cycle.
    pub fn is_expired(&self, record_ttl: Duration, now: i64) -> bool {
        elapsed(self.created_at, now) >= record_ttl
    }

    /// Whether a `Pending` claim has outlived the claim TTL at `now`.
    ///
    /// A stale claim means the executor likely crashed without calling
    /// complete; the next claimant may take over.
    pub fn claim_expired(&self, claim_ttl: Duration, now: i64) -> bool {
        self.is_pending() && elapsed(self.claimed_at, now) >= claim_ttl
    }
}

fn elapsed(since: i64, now: i64) -> Duration {
    Duration::from_millis(now.saturating_sub(since).max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> IdempotencyKey {
        IdempotencyKey::new(s).unwrap()
    }

    #[test]
    fn pending_record_has_no_result() {
        let rec = IdempotencyRecord::pending(key("k"), 1_000);
        assert!(rec.is_pending());
        assert!(rec.result.is_none());
        assert_eq!(rec.created_at, rec.claimed_at);
    }

    #[test]
    fn complete_attaches_result() {
        let mut rec = IdempotencyRecord::pending(key("k"), 1_000);
        rec.complete(Payload::new(b"r".to_vec()));
        assert!(rec.is_completed());
        assert_eq!(rec.result.as_ref().unwrap().as_bytes(), b"r");
    }

    #[test]
    fn record_expires_after_ttl() {
        let rec = IdempotencyRecord::pending(key("k"), 0);
        let ttl = Duration::from_millis(500);
        assert!(!rec.is_expired(ttl, 499));
        assert!(rec.is_expired(ttl, 500));
    }

    #[test]
    fn claim_expiry_applies_only_to_pending() {
        let claim_ttl = Duration::from_millis(100);
        let mut rec = IdempotencyRecord::pending(key("k"), 0);
        assert!(rec.claim_expired(claim_ttl, 100));
        rec.complete(Payload::new(vec![]));
        assert!(!rec.claim_expired(claim_ttl, 100));
    }

    #[test]
    fn clock_skew_does_not_expire_fresh_records() {
        // claimed_at in the "future" relative to now
        let rec = IdempotencyRecord::pending(key("k"), 2_000);
        assert!(!rec.is_expired(Duration::from_millis(1), 1_000));
    }
}
