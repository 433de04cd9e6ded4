//! DashMap-backed record store.
//!
//! # Design
//!
//! - DashMap: sharded by key, entry API gives per-key atomicity
//! - Lazy expiry: reads treat expired records as absent and drop them
//! - Claim takeover: a `Pending` record older than `claim_ttl` is
//!   replaced by the next claimant's fresh record
//!
//! # Thread Safety
//!
//! All operations are thread-safe. `create_if_absent` and `write_result`
//! hold only the target key's shard lock for the duration of the record
//! mutation; waiter notification happens strictly after the shard lock is
//! released, so record and waiter locks are never held together.

use crate::notify::WaiterTable;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use oncekey_core::{
    now_millis, CoordinatorConfig, CreateOutcome, IdempotencyKey, IdempotencyRecord, Payload,
    RecordStore, Result, WriteOutcome,
};
use std::time::{Duration, Instant};

/// In-memory [`RecordStore`] implementation.
///
/// # Example
///
/// ```ignore
/// use oncekey_store::MemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// ```
pub struct MemoryStore {
    config: CoordinatorConfig,
    records: DashMap<IdempotencyKey, IdempotencyRecord>,
    waiters: WaiterTable,
}

impl MemoryStore {
    /// Create a store with default TTLs.
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
            .unwrap_or_else(|_| unreachable!("default config is valid"))
    }

    /// Create a store with explicit TTL configuration.
    pub fn with_config(config: CoordinatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            records: DashMap::new(),
            waiters: WaiterTable::new(),
        })
    }

    /// The store's TTL configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Number of live (non-expired) records.
    pub fn len(&self) -> usize {
        let now = now_millis();
        self.records
            .iter()
            .filter(|entry| !entry.value().is_expired(self.config.record_ttl, now))
            .count()
    }

    /// Whether the store holds no live records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn create_if_absent(&self, key: &IdempotencyKey) -> Result<CreateOutcome> {
        let now = now_millis();
        match self.records.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get();
                if record.is_expired(self.config.record_ttl, now) {
                    occupied.insert(IdempotencyRecord::pending(key.clone(), now));
                    Ok(CreateOutcome::Created)
                } else if record.claim_expired(self.config.claim_ttl, now) {
                    // Executor crashed or stalled past the claim TTL.
                    tracing::warn!(
                        key = %key,
                        claimed_at = record.claimed_at,
                        "reclaiming expired pending claim"
                    );
                    occupied.insert(IdempotencyRecord::pending(key.clone(), now));
                    Ok(CreateOutcome::Created)
                } else {
                    Ok(CreateOutcome::Existing(record.clone()))
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(IdempotencyRecord::pending(key.clone(), now));
                Ok(CreateOutcome::Created)
            }
        }
    }

    fn read(&self, key: &IdempotencyKey) -> Result<Option<IdempotencyRecord>> {
        let now = now_millis();
        // Drop the record if it expired; the predicate re-checks under the
        // shard lock, so a freshly re-created record survives.
        self.records
            .remove_if(key, |_, record| record.is_expired(self.config.record_ttl, now));
        Ok(self
            .records
            .get(key)
            .map(|entry| entry.value().clone())
            .filter(|record| !record.is_expired(self.config.record_ttl, now)))
    }

    fn write_result(&self, key: &IdempotencyKey, result: Payload) -> Result<WriteOutcome> {
        let now = now_millis();
        let outcome = match self.records.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(self.config.record_ttl, now) {
                    occupied.insert(IdempotencyRecord::completed(key.clone(), result, now));
                    WriteOutcome::Seeded
                } else if occupied.get().is_completed() {
                    WriteOutcome::AlreadyCompleted
                } else {
                    occupied.get_mut().complete(result);
                    WriteOutcome::Stored
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(IdempotencyRecord::completed(key.clone(), result, now));
                WriteOutcome::Seeded
            }
        };
        // Shard lock is released; the completed record is visible to
        // readers before anyone is woken.
        match outcome {
            WriteOutcome::Stored | WriteOutcome::Seeded => self.waiters.notify_completed(key),
            WriteOutcome::AlreadyCompleted => {}
        }
        Ok(outcome)
    }

    fn await_result(&self, key: &IdempotencyKey, timeout: Duration) -> Result<Option<Payload>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(record) = self.read(key)? {
                if record.is_completed() {
                    return Ok(record.result);
                }
            }
            let waiter = self.waiters.register(key);
            // Re-read after registering: a completion that landed between
            // the read above and registration is visible here.
            if let Some(record) = self.read(key)? {
                if record.is_completed() {
                    self.waiters.prune(key, &waiter);
                    return Ok(record.result);
                }
            }
            if waiter.wait_until(deadline) {
                continue;
            }
            // Timed out. One last read covers a completion whose
            // notification this waiter missed.
            let last = self.read(key)?.filter(|record| record.is_completed());
            self.waiters.prune(key, &waiter);
            return Ok(last.and_then(|record| record.result));
        }
    }

    fn purge_expired(&self) -> Result<usize> {
        let now = now_millis();
        let before = self.records.len();
        self.records
            .retain(|_, record| !record.is_expired(self.config.record_ttl, now));
        Ok(before.saturating_sub(self.records.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn key(s: &str) -> IdempotencyKey {
        IdempotencyKey::new(s).unwrap()
    }

    fn payload(s: &str) -> Payload {
        Payload::new(s.as_bytes().to_vec())
    }

    fn short_ttl_store(record_ms: u64, claim_ms: u64) -> MemoryStore {
        MemoryStore::with_config(CoordinatorConfig {
            record_ttl: Duration::from_millis(record_ms),
            claim_ttl: Duration::from_millis(claim_ms),
        })
        .unwrap()
    }

    #[test]
    fn first_create_wins_second_observes_pending() {
        let store = MemoryStore::new();
        let k = key("k");
        assert_eq!(store.create_if_absent(&k).unwrap(), CreateOutcome::Created);
        match store.create_if_absent(&k).unwrap() {
            CreateOutcome::Existing(record) => assert!(record.is_pending()),
            other => panic!("expected Existing, got {:?}", other),
        }
    }

    #[test]
    fn write_then_create_replays_completed_record() {
        let store = MemoryStore::new();
        let k = key("k");
        store.create_if_absent(&k).unwrap();
        assert_eq!(store.write_result(&k, payload("r")).unwrap(), WriteOutcome::Stored);
        match store.create_if_absent(&k).unwrap() {
            CreateOutcome::Existing(record) => {
                assert!(record.is_completed());
                assert_eq!(record.result.unwrap(), payload("r"));
            }
            other => panic!("expected Existing, got {:?}", other),
        }
    }

    #[test]
    fn second_write_is_noop() {
        let store = MemoryStore::new();
        let k = key("k");
        store.create_if_absent(&k).unwrap();
        store.write_result(&k, payload("first")).unwrap();
        assert_eq!(
            store.write_result(&k, payload("second")).unwrap(),
            WriteOutcome::AlreadyCompleted
        );
        let record = store.read(&k).unwrap().unwrap();
        assert_eq!(record.result.unwrap(), payload("first"));
    }

    #[test]
    fn write_without_record_seeds_completed() {
        let store = MemoryStore::new();
        let k = key("k");
        assert_eq!(store.write_result(&k, payload("r")).unwrap(), WriteOutcome::Seeded);
        let record = store.read(&k).unwrap().unwrap();
        assert!(record.is_completed());
    }

    #[test]
    fn expired_record_reads_as_absent_and_reclaims() {
        let store = short_ttl_store(40, 20);
        let k = key("k");
        store.create_if_absent(&k).unwrap();
        store.write_result(&k, payload("r")).unwrap();
        thread::sleep(Duration::from_millis(60));
        assert!(store.read(&k).unwrap().is_none());
        assert_eq!(store.create_if_absent(&k).unwrap(), CreateOutcome::Created);
    }

    #[test]
    fn stale_pending_claim_is_taken_over() {
        let store = short_ttl_store(10_000, 30);
        let k = key("k");
        store.create_if_absent(&k).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(store.create_if_absent(&k).unwrap(), CreateOutcome::Created);
    }

    #[test]
    fn fresh_pending_claim_is_not_taken_over() {
        let store = short_ttl_store(10_000, 5_000);
        let k = key("k");
        store.create_if_absent(&k).unwrap();
        match store.create_if_absent(&k).unwrap() {
            CreateOutcome::Existing(record) => assert!(record.is_pending()),
            other => panic!("expected Existing, got {:?}", other),
        }
    }

    #[test]
    fn await_returns_payload_after_completion() {
        let store = Arc::new(MemoryStore::new());
        let k = key("k");
        store.create_if_absent(&k).unwrap();

        let writer = Arc::clone(&store);
        let wk = k.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            writer.write_result(&wk, payload("done")).unwrap();
        });

        let got = store.await_result(&k, Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
        assert_eq!(got, Some(payload("done")));
    }

    #[test]
    fn await_times_out_when_nothing_completes() {
        let store = MemoryStore::new();
        let k = key("k");
        store.create_if_absent(&k).unwrap();
        let got = store.await_result(&k, Duration::from_millis(30)).unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn await_on_already_completed_returns_immediately() {
        let store = MemoryStore::new();
        let k = key("k");
        store.create_if_absent(&k).unwrap();
        store.write_result(&k, payload("r")).unwrap();
        let started = Instant::now();
        let got = store.await_result(&k, Duration::from_secs(60)).unwrap();
        assert_eq!(got, Some(payload("r")));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn purge_removes_only_expired_records() {
        let store = short_ttl_store(50, 20);
        let old = key("old");
        store.create_if_absent(&old).unwrap();
        thread::sleep(Duration::from_millis(70));
        let fresh = key("fresh");
        store.create_if_absent(&fresh).unwrap();

        assert_eq!(store.purge_expired().unwrap(), 1);
        assert!(store.read(&fresh).unwrap().is_some());
    }

    #[test]
    fn concurrent_creates_yield_exactly_one_created() {
        let store = Arc::new(MemoryStore::new());
        let k = key("contested");
        let threads: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                let k = k.clone();
                thread::spawn(move || store.create_if_absent(&k).unwrap())
            })
            .collect();
        let outcomes: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();
        let created = outcomes
            .iter()
            .filter(|o| matches!(o, CreateOutcome::Created))
            .count();
        assert_eq!(created, 1);
    }
}
