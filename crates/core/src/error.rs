//! Unified error types for Oncekey.
//!
//! This module provides the canonical error type for all coordinator and
//! store operations. Logical outcomes that require a caller decision
//! (`Busy`, `AlreadyCompleted`, `NotFound`, await timeouts) are NOT errors;
//! they are variants of the operation outcome enums. Only genuine failures
//! live here.

use thiserror::Error;

/// All Oncekey errors.
///
/// This is the canonical error type for all coordinator operations.
/// It provides a clean, stable interface that hides store internals.
#[derive(Debug, Error)]
pub enum Error {
    /// Backing store unreachable or erroring.
    ///
    /// Never retried internally; the caller chooses whether to retry,
    /// fail the request, or degrade to executing without the guarantee.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Invalid idempotency key (empty, oversized, or malformed)
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Typed-boundary serialization or deserialization failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for Oncekey operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// A store outage may clear on retry with fresh state; the other
    /// variants will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_))
    }

    /// Check if this is a store-availability error.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::StoreUnavailable(_))
    }

    /// Check if this is a serious/unrecoverable error.
    pub fn is_serious(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

// Convert from serde_json errors at the typed boundary
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_unavailable_is_retryable() {
        let err = Error::StoreUnavailable("connection refused".into());
        assert!(err.is_retryable());
        assert!(err.is_store_unavailable());
        assert!(!err.is_serious());
    }

    #[test]
    fn invalid_key_is_not_retryable() {
        let err = Error::InvalidKey("empty".into());
        assert!(!err.is_retryable());
    }

    #[test]
    fn serde_errors_map_to_serialization() {
        let bad: std::result::Result<u64, _> = serde_json::from_str("not json");
        let err: Error = bad.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
