//! Coordinator state machine.
//!
//! The coordinator holds no lock of its own; every ordering guarantee is
//! delegated to the store's atomic create-if-absent and write-once
//! primitives. Any number of coordinator instances may share one store,
//! which is what makes the design horizontally scalable.
//!
//! ## Claim cycle
//!
//! ```text
//! claim(key) ──> Proceed        caller runs the operation, then complete()
//!           ──> Replay(result)  operation already ran; return result verbatim
//!           ──> Busy            another executor in flight; await_result()
//! ```
//!
//! A caller that receives `Replay` must return the stored result verbatim,
//! indistinguishable (aside from latency) from the original response.

use oncekey_core::{
    CreateOutcome, Error, IdempotencyKey, Payload, RecordStore, Result, WriteOutcome,
};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a claim attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    /// The caller is the exclusive executor for this key.
    Proceed,
    /// The operation already completed; return this stored result.
    Replay(Payload),
    /// Another executor is in flight; wait or fail fast.
    Busy,
}

/// Outcome of a completion attempt.
///
/// `NotFound` and `AlreadyCompleted` are anomalies, not failures: they are
/// logged and surfaced so the caller can alert, but the operation's result
/// handling proceeds either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Result stored; waiters released.
    Stored,
    /// The record vanished before completion (TTL expiry or external
    /// deletion). A fresh completed record was seeded, but replay
    /// integrity for the missing interval is not guaranteed.
    NotFound,
    /// A result was already stored for this key; this call was a no-op.
    /// Signals caller misuse of the exactly-once completion contract.
    AlreadyCompleted,
}

/// Outcome of waiting on a busy key.
#[derive(Debug, Clone, PartialEq)]
pub enum Awaited {
    /// The in-flight executor completed; return this stored result.
    Replay(Payload),
    /// The deadline passed first. The caller decides whether to retry
    /// `claim`, error out, or degrade.
    TimedOut,
}

/// Outcome of the one-call execute driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// This caller ran the operation; result attached.
    Executed(Payload),
    /// Another caller ran the operation (earlier or concurrently); the
    /// stored result is attached.
    Replayed(Payload),
    /// The key stayed busy past the deadline.
    TimedOut,
}

/// Serializes concurrent attempts to execute the same logical operation
/// and replays the stored result to every later or racing caller.
///
/// # Example
///
/// ```ignore
/// use oncekey_coordinator::{Claim, IdempotencyCoordinator};
/// use oncekey_store::MemoryStore;
/// use std::sync::Arc;
///
/// let coordinator = IdempotencyCoordinator::new(Arc::new(MemoryStore::new()));
/// let key = IdempotencyKey::new("order-123")?;
///
/// match coordinator.claim(&key)? {
///     Claim::Proceed => {
///         let result = run_the_operation()?;
///         coordinator.complete(&key, result)?;
///     }
///     Claim::Replay(stored) => return Ok(stored),
///     Claim::Busy => match coordinator.await_result(&key, timeout)? {
///         Awaited::Replay(stored) => return Ok(stored),
///         Awaited::TimedOut => return Err(busy_timeout()),
///     },
/// }
/// ```
pub struct IdempotencyCoordinator<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> IdempotencyCoordinator<S> {
    /// Create a coordinator over an injected store handle.
    ///
    /// The store is an explicit dependency with its own lifecycle; the
    /// coordinator never holds ambient global state.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The backing store handle.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Attempt to claim `key`.
    ///
    /// Exactly one of any set of concurrent claims for a key receives
    /// [`Claim::Proceed`]; the rest observe [`Claim::Busy`] or
    /// [`Claim::Replay`]. Never blocks beyond one store round trip.
    pub fn claim(&self, key: &IdempotencyKey) -> Result<Claim> {
        match self.store.create_if_absent(key)? {
            CreateOutcome::Created => {
                tracing::debug!(key = %key, "claimed key for execution");
                Ok(Claim::Proceed)
            }
            CreateOutcome::Existing(record) => {
                if record.is_completed() {
                    let result = record.result.ok_or_else(|| {
                        Error::Internal(format!("completed record for {} has no result", key))
                    })?;
                    tracing::debug!(key = %key, "replaying stored result");
                    Ok(Claim::Replay(result))
                } else {
                    tracing::debug!(key = %key, "key busy, executor in flight");
                    Ok(Claim::Busy)
                }
            }
        }
    }

    /// Store the result for `key` and release waiters.
    ///
    /// Must be called exactly once per [`Claim::Proceed`], after the
    /// operation finishes, whatever its business outcome (the payload may
    /// be an error envelope; the coordinator is agnostic). Never blocks
    /// beyond one store round trip.
    pub fn complete(&self, key: &IdempotencyKey, result: Payload) -> Result<Completion> {
        match self.store.write_result(key, result)? {
            WriteOutcome::Stored => {
                tracing::debug!(key = %key, "stored result, waiters released");
                Ok(Completion::Stored)
            }
            WriteOutcome::Seeded => {
                tracing::warn!(
                    key = %key,
                    "record vanished before completion; seeded fresh result"
                );
                Ok(Completion::NotFound)
            }
            WriteOutcome::AlreadyCompleted => {
                tracing::warn!(
                    key = %key,
                    "duplicate completion ignored, original result retained"
                );
                Ok(Completion::AlreadyCompleted)
            }
        }
    }

    /// Wait for a busy key to complete, up to `timeout`.
    ///
    /// Push-based: the waiter suspends on the store's notification
    /// mechanism rather than polling. A key that is already completed
    /// replays immediately.
    pub fn await_result(&self, key: &IdempotencyKey, timeout: Duration) -> Result<Awaited> {
        match self.store.await_result(key, timeout)? {
            Some(result) => Ok(Awaited::Replay(result)),
            None => {
                tracing::debug!(key = %key, ?timeout, "await timed out");
                Ok(Awaited::TimedOut)
            }
        }
    }

    /// Run `op` at most once for `key`.
    ///
    /// Claims the key; on [`Claim::Proceed`] runs `op` and completes with
    /// its payload. On [`Claim::Replay`] returns the stored result. On
    /// [`Claim::Busy`] waits up to `busy_timeout` for the in-flight
    /// executor.
    ///
    /// If `op` itself fails, no completion is written: the error
    /// propagates and the claim ages out via claim expiry, after which a
    /// later caller may retry execution. Callers that want failed business
    /// operations to replay should encode the failure as a payload
    /// envelope and return it as `Ok`.
    pub fn execute<F>(
        &self,
        key: &IdempotencyKey,
        busy_timeout: Duration,
        op: F,
    ) -> Result<Execution>
    where
        F: FnOnce() -> Result<Payload>,
    {
        match self.claim(key)? {
            Claim::Proceed => {
                let result = op()?;
                self.complete(key, result.clone())?;
                Ok(Execution::Executed(result))
            }
            Claim::Replay(result) => Ok(Execution::Replayed(result)),
            Claim::Busy => match self.await_result(key, busy_timeout)? {
                Awaited::Replay(result) => Ok(Execution::Replayed(result)),
                Awaited::TimedOut => Ok(Execution::TimedOut),
            },
        }
    }
}

impl<S: RecordStore> Clone for IdempotencyCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
