//! Main service entry point for Oncekey.
//!
//! This module provides the `Oncekey` struct, the primary entry point for
//! callers that want a memory-store-backed coordinator without wiring the
//! layers by hand.

use crate::typed::TypedCoordinator;
use oncekey_coordinator::IdempotencyCoordinator;
use oncekey_core::{CoordinatorConfig, Result};
use oncekey_store::MemoryStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// The Oncekey service.
///
/// Owns the backing store and exposes the coordinator surface. The store
/// handle is created at construction and injected into the coordinator;
/// there is no ambient/global store state.
///
/// # Example
///
/// ```ignore
/// use oncekey::prelude::*;
///
/// // Default TTLs (24h record, 30s claim)
/// let service = Oncekey::open();
///
/// // Custom TTLs
/// let service = Oncekey::builder()
///     .record_ttl(Duration::from_secs(3600))
///     .claim_ttl(Duration::from_secs(10))
///     .build()?;
/// ```
pub struct Oncekey {
    coordinator: IdempotencyCoordinator<MemoryStore>,
}

impl Oncekey {
    /// Open a service with default TTL configuration.
    pub fn open() -> Self {
        Self {
            coordinator: IdempotencyCoordinator::new(Arc::new(MemoryStore::new())),
        }
    }

    /// Create a builder for TTL configuration.
    pub fn builder() -> OncekeyBuilder {
        OncekeyBuilder::new()
    }

    /// The raw, payload-level coordinator.
    pub fn coordinator(&self) -> &IdempotencyCoordinator<MemoryStore> {
        &self.coordinator
    }

    /// A typed view over the same coordinator.
    ///
    /// Results are serde_json-encoded at this boundary; the stored bytes
    /// round-trip exactly, so replays are byte-identical to the original
    /// result.
    pub fn typed<T>(&self) -> TypedCoordinator<T, MemoryStore>
    where
        T: Serialize + DeserializeOwned,
    {
        TypedCoordinator::new(self.coordinator.clone())
    }

    /// Remove expired records from the backing store.
    ///
    /// Reads already treat expired records as absent; this reclaims the
    /// memory. Returns the number of records removed.
    pub fn purge_expired(&self) -> Result<usize> {
        use oncekey_core::RecordStore;
        self.coordinator.store().purge_expired()
    }
}

/// Builder for [`Oncekey`] TTL configuration.
#[derive(Debug, Default)]
pub struct OncekeyBuilder {
    config: CoordinatorConfig,
}

impl OncekeyBuilder {
    /// Create a builder with default TTLs.
    pub fn new() -> Self {
        Self {
            config: CoordinatorConfig::default(),
        }
    }

    /// Total record lifetime; expired records read as absent.
    pub fn record_ttl(mut self, ttl: Duration) -> Self {
        self.config.record_ttl = ttl;
        self
    }

    /// Maximum `Pending` lifetime before a stuck claim becomes
    /// reclaimable by the next claimant.
    pub fn claim_ttl(mut self, ttl: Duration) -> Self {
        self.config.claim_ttl = ttl;
        self
    }

    /// Build the service, validating the TTL relationship.
    pub fn build(self) -> Result<Oncekey> {
        let store = MemoryStore::with_config(self.config)?;
        Ok(Oncekey {
            coordinator: IdempotencyCoordinator::new(Arc::new(store)),
        })
    }
}
