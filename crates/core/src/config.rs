//! Coordinator configuration.

use crate::error::{Error, Result};
use std::time::Duration;

/// Default record lifetime: 24 hours.
pub const DEFAULT_RECORD_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default claim lifetime: 30 seconds.
pub const DEFAULT_CLAIM_TTL: Duration = Duration::from_secs(30);

/// TTL and claim-expiry configuration.
///
/// `record_ttl` bounds how long a completed result replays; `claim_ttl`
/// bounds how long a crashed executor can hold a key before the next
/// claimant takes over. `claim_ttl` must be shorter than `record_ttl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Total record lifetime. Expired records read as absent.
    pub record_ttl: Duration,
    /// Maximum `Pending` lifetime before a claim becomes reclaimable.
    pub claim_ttl: Duration,
}

impl CoordinatorConfig {
    /// Create a config, validating the TTL relationship.
    pub fn new(record_ttl: Duration, claim_ttl: Duration) -> Result<Self> {
        let config = Self {
            record_ttl,
            claim_ttl,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate TTL constraints.
    ///
    /// Both TTLs must be non-zero and `claim_ttl` strictly shorter than
    /// `record_ttl` (a claim that outlives its record can never be
    /// reclaimed before the record vanishes).
    pub fn validate(&self) -> Result<()> {
        if self.record_ttl.is_zero() {
            return Err(Error::Internal("record_ttl must be non-zero".into()));
        }
        if self.claim_ttl.is_zero() {
            return Err(Error::Internal("claim_ttl must be non-zero".into()));
        }
        if self.claim_ttl >= self.record_ttl {
            return Err(Error::Internal(format!(
                "claim_ttl ({:?}) must be shorter than record_ttl ({:?})",
                self.claim_ttl, self.record_ttl
            )));
        }
        Ok(())
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            record_ttl: DEFAULT_RECORD_TTL,
            claim_ttl: DEFAULT_CLAIM_TTL,
        }
    }
}
