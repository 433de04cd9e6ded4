//! Typed coordination boundary.
//!
//! The core stores opaque payload bytes; this module is where typed
//! callers serialize and deserialize. Encoding is serde_json, chosen for
//! the exact round-trip guarantee on derived types; the stored bytes are
//! replayed verbatim, so a replay decodes to exactly the value the
//! original executor produced.

use oncekey_coordinator::{Awaited, Claim, Completion, IdempotencyCoordinator};
use oncekey_core::{IdempotencyKey, Payload, RecordStore, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Duration;

/// Typed outcome of a claim attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedClaim<T> {
    /// The caller is the exclusive executor for this key.
    Proceed,
    /// The operation already completed; decoded stored result attached.
    Replay(T),
    /// Another executor is in flight; wait or fail fast.
    Busy,
}

/// Typed outcome of the one-call execute driver.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedExecution<T> {
    /// This caller ran the operation.
    Executed(T),
    /// A racing or earlier caller ran the operation; same result.
    Replayed(T),
    /// The key stayed busy past the deadline.
    TimedOut,
}

/// A typed view over an [`IdempotencyCoordinator`].
///
/// Serializes results on `complete` and deserializes on replay, keeping
/// the coordinator itself type-agnostic. Multiple typed views may share
/// one coordinator (and one store), each with its own result type.
pub struct TypedCoordinator<T, S: RecordStore> {
    inner: IdempotencyCoordinator<S>,
    _result: PhantomData<fn() -> T>,
}

impl<T, S> TypedCoordinator<T, S>
where
    T: Serialize + DeserializeOwned,
    S: RecordStore,
{
    /// Wrap a coordinator in a typed view.
    pub fn new(inner: IdempotencyCoordinator<S>) -> Self {
        Self {
            inner,
            _result: PhantomData,
        }
    }

    /// Attempt to claim `key`, decoding any replayed result.
    pub fn claim(&self, key: &IdempotencyKey) -> Result<TypedClaim<T>> {
        Ok(match self.inner.claim(key)? {
            Claim::Proceed => TypedClaim::Proceed,
            Claim::Replay(payload) => TypedClaim::Replay(decode(&payload)?),
            Claim::Busy => TypedClaim::Busy,
        })
    }

    /// Encode `result` and store it for `key`.
    pub fn complete(&self, key: &IdempotencyKey, result: &T) -> Result<Completion> {
        self.inner.complete(key, encode(result)?)
    }

    /// Wait for a busy key, decoding the result on release.
    ///
    /// Returns `None` on timeout.
    pub fn await_result(&self, key: &IdempotencyKey, timeout: Duration) -> Result<Option<T>> {
        Ok(match self.inner.await_result(key, timeout)? {
            Awaited::Replay(payload) => Some(decode(&payload)?),
            Awaited::TimedOut => None,
        })
    }

    /// Run `op` at most once for `key`, with typed results.
    ///
    /// The executing caller's own value is returned without a decode
    /// round trip; replayed results are decoded from the stored bytes.
    pub fn execute<F>(
        &self,
        key: &IdempotencyKey,
        busy_timeout: Duration,
        op: F,
    ) -> Result<TypedExecution<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        match self.inner.claim(key)? {
            Claim::Proceed => {
                let value = op()?;
                self.inner.complete(key, encode(&value)?)?;
                Ok(TypedExecution::Executed(value))
            }
            Claim::Replay(payload) => Ok(TypedExecution::Replayed(decode(&payload)?)),
            Claim::Busy => Ok(match self.inner.await_result(key, busy_timeout)? {
                Awaited::Replay(payload) => TypedExecution::Replayed(decode(&payload)?),
                Awaited::TimedOut => TypedExecution::TimedOut,
            }),
        }
    }

    /// The underlying payload-level coordinator.
    pub fn inner(&self) -> &IdempotencyCoordinator<S> {
        &self.inner
    }
}

impl<T, S: RecordStore> Clone for TypedCoordinator<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _result: PhantomData,
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Payload> {
    Ok(Payload::new(serde_json::to_vec(value)?))
}

fn decode<T: DeserializeOwned>(payload: &Payload) -> Result<T> {
    Ok(serde_json::from_slice(payload.as_bytes())?)
}
