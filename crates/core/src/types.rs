//! Key and payload types.
//!
//! `IdempotencyKey` is a validated newtype over the caller-supplied key
//! string. `Payload` carries the opaque serialized result bytes; the core
//! never interprets them, so any serialization format round-trips exactly.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum key length in bytes.
///
/// Keys are caller-supplied and end up in store shards and log fields;
/// the cap keeps both bounded.
pub const MAX_KEY_BYTES: usize = 512;

/// A caller-supplied idempotency key.
///
/// Globally unique per logical operation instance. Validated at
/// construction: non-empty, at most [`MAX_KEY_BYTES`] bytes, no interior
/// NUL bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Create a validated key.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::InvalidKey("key must not be empty".into()));
        }
        if key.len() > MAX_KEY_BYTES {
            return Err(Error::InvalidKey(format!(
                "key exceeds {} bytes ({})",
                MAX_KEY_BYTES,
                key.len()
            )));
        }
        if key.contains('\0') {
            return Err(Error::InvalidKey("key must not contain NUL".into()));
        }
        Ok(Self(key))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque serialized result bytes.
///
/// Write-once per key. The coordinator stores and replays these verbatim;
/// typed callers encode and decode at the facade boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Wrap raw serialized bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Current timestamp in epoch milliseconds.
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_key_round_trips() {
        let key = IdempotencyKey::new("order-123").unwrap();
        assert_eq!(key.as_str(), "order-123");
        assert_eq!(key.to_string(), "order-123");
    }

    #[test]
    fn empty_key_rejected() {
        assert!(matches!(
            IdempotencyKey::new(""),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn oversized_key_rejected() {
        let long = "k".repeat(MAX_KEY_BYTES + 1);
        assert!(IdempotencyKey::new(long).is_err());
    }

    #[test]
    fn max_length_key_accepted() {
        let exact = "k".repeat(MAX_KEY_BYTES);
        assert!(IdempotencyKey::new(exact).is_ok());
    }

    #[test]
    fn nul_byte_rejected() {
        assert!(IdempotencyKey::new("a\0b").is_err());
    }

    #[test]
    fn payload_preserves_bytes() {
        let raw = vec![0u8, 255, 1, 2, 3];
        let payload = Payload::new(raw.clone());
        assert_eq!(payload.as_bytes(), raw.as_slice());
        assert_eq!(payload.into_bytes(), raw);
    }

    proptest! {
        #[test]
        fn arbitrary_bytes_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..1024)) {
            let payload = Payload::new(bytes.clone());
            prop_assert_eq!(payload.len(), bytes.len());
            prop_assert_eq!(payload.into_bytes(), bytes);
        }
    }
}
