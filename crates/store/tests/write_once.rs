//! Write-once property tests for the memory store.

use oncekey_core::{IdempotencyKey, Payload, RecordStore, WriteOutcome};
use oncekey_store::MemoryStore;
use proptest::prelude::*;

proptest! {
    /// Whatever sequence of writes lands on a key, the first one sticks.
    #[test]
    fn first_write_wins(payloads in proptest::collection::vec(
        proptest::collection::vec(any::<u8>(), 0..64),
        1..8,
    )) {
        let store = MemoryStore::new();
        let key = IdempotencyKey::new(uuid::Uuid::new_v4().to_string()).unwrap();
        store.create_if_absent(&key).unwrap();

        let first = Payload::new(payloads[0].clone());
        prop_assert_eq!(
            store.write_result(&key, first.clone()).unwrap(),
            WriteOutcome::Stored
        );
        for later in &payloads[1..] {
            prop_assert_eq!(
                store.write_result(&key, Payload::new(later.clone())).unwrap(),
                WriteOutcome::AlreadyCompleted
            );
        }

        let record = store.read(&key).unwrap().unwrap();
        prop_assert_eq!(record.result.unwrap(), first);
    }

    /// Concurrent writers race to complete; exactly one write sticks and
    /// every reader sees that single payload.
    #[test]
    fn racing_writers_store_exactly_one_result(seed in 0u8..=255) {
        let _ = seed;
        let store = std::sync::Arc::new(MemoryStore::new());
        let key = IdempotencyKey::new(uuid::Uuid::new_v4().to_string()).unwrap();
        store.create_if_absent(&key).unwrap();

        let threads: Vec<_> = (0u8..4)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                let key = key.clone();
                std::thread::spawn(move || {
                    store.write_result(&key, Payload::new(vec![i])).unwrap()
                })
            })
            .collect();
        let outcomes: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();

        let stored = outcomes.iter().filter(|o| **o == WriteOutcome::Stored).count();
        prop_assert_eq!(stored, 1);

        let winner = outcomes.iter().position(|o| *o == WriteOutcome::Stored).unwrap();
        let record = store.read(&key).unwrap().unwrap();
        prop_assert_eq!(record.result.unwrap(), Payload::new(vec![winner as u8]));
    }
}
