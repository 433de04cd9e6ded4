//! Completion notification.
//!
//! One `Waiter` per key with at least one blocked `await_result` call.
//! Completion flips the done flag and wakes everyone; waiters re-read the
//! record to pick up the payload, so the flag never carries data.
//!
//! # Missed-wakeup safety
//!
//! The completion path writes the record BEFORE notifying, and waiters
//! re-read the record after registering and before sleeping. A waiter that
//! misses the notification (e.g. its table entry was pruned by a racing
//! timeout) still re-reads the record at its own deadline and returns the
//! stored payload; the miss costs latency, never correctness.

use dashmap::DashMap;
use oncekey_core::IdempotencyKey;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Instant;

/// A single key's wait point.
pub(crate) struct Waiter {
    done: Mutex<bool>,
    cvar: Condvar,
}

impl Waiter {
    fn new() -> Self {
        Self {
            done: Mutex::new(false),
            cvar: Condvar::new(),
        }
    }

    /// Block until notified or `deadline` passes.
    ///
    /// Returns `true` if the done flag was set (completion observed),
    /// `false` on timeout.
    pub(crate) fn wait_until(&self, deadline: Instant) -> bool {
        let mut done = self.done.lock();
        while !*done {
            if self.cvar.wait_until(&mut done, deadline).timed_out() {
                return *done;
            }
        }
        true
    }

    /// Whether completion has already been observed.
    pub(crate) fn is_done(&self) -> bool {
        *self.done.lock()
    }

    fn complete(&self) {
        let mut done = self.done.lock();
        *done = true;
        self.cvar.notify_all();
    }
}

/// Table of active waiters, keyed by idempotency key.
#[derive(Default)]
pub(crate) struct WaiterTable {
    waiters: DashMap<IdempotencyKey, Arc<Waiter>>,
}

impl WaiterTable {
    pub(crate) fn new() -> Self {
        Self {
            waiters: DashMap::new(),
        }
    }

    /// Get or create the waiter for `key`.
    pub(crate) fn register(&self, key: &IdempotencyKey) -> Arc<Waiter> {
        self.waiters
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Waiter::new()))
            .clone()
    }

    /// Wake every waiter for `key` and drop the table entry.
    ///
    /// Must be called only after the completed record is visible to
    /// readers.
    pub(crate) fn notify_completed(&self, key: &IdempotencyKey) {
        if let Some((_, waiter)) = self.waiters.remove(key) {
            waiter.complete();
        }
    }

    /// Drop `key`'s entry if this caller holds the last outstanding
    /// reference (the table's plus its own).
    ///
    /// Best-effort pruning after a timeout; a racing registration simply
    /// re-creates the entry.
    pub(crate) fn prune(&self, key: &IdempotencyKey, handle: &Arc<Waiter>) {
        self.waiters
            .remove_if(key, |_, w| Arc::ptr_eq(w, handle) && Arc::strong_count(w) <= 2);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.waiters.len()
    }
}
