//! Snapshot Store
//!
//! Owns the current in-memory set of order records. A refresh assembles the
//! full record set off to the side and installs it here in one atomic swap;
//! readers hold a cheap reference to whichever snapshot was current when
//! they asked and are never exposed to a partially written one.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::order::OrderRecord;

/// The complete record set as of the last successful refresh.
pub type Snapshot = Arc<[OrderRecord]>;

/// Concurrency-safe holder of the current [`Snapshot`].
///
/// `replace` swaps the snapshot wholesale; `read` clones the `Arc` under a
/// read lock, so readers wait only for the swap itself, never for an
/// in-flight fetch.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Snapshot>,
}

impl SnapshotStore {
    /// Create a store holding an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// Atomically install a new snapshot.
    pub fn replace(&self, records: Vec<OrderRecord>) {
        *self.current.write() = Arc::from(records);
    }

    /// Get the current snapshot.
    #[must_use]
    pub fn read(&self) -> Snapshot {
        Arc::clone(&self.current.read())
    }

    /// Number of records in the current snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    /// Check whether the current snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::order::OrderStatus;

    fn record(id: &str) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            status: OrderStatus::Placed,
            placed_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            price: Decimal::ONE,
            product_name: "bow".to_string(),
        }
    }

    #[test]
    fn starts_empty() {
        let store = SnapshotStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.read().len(), 0);
    }

    #[test]
    fn replace_installs_new_snapshot() {
        let store = SnapshotStore::new();
        store.replace(vec![record("a"), record("b")]);
        let snapshot = store.read();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, "a");
        assert_eq!(snapshot[1].id, "b");
    }

    #[test]
    fn readers_keep_their_snapshot_across_replace() {
        let store = SnapshotStore::new();
        store.replace(vec![record("old")]);

        let before = store.read();
        store.replace(vec![record("new-1"), record("new-2")]);

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].id, "old");
        assert_eq!(store.read().len(), 2);
    }

    #[test]
    fn replace_with_empty_clears() {
        let store = SnapshotStore::new();
        store.replace(vec![record("a")]);
        store.replace(Vec::new());
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_reads_during_replace() {
        let store = Arc::new(SnapshotStore::new());
        store.replace(vec![record("seed")]);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        let snapshot = store.read();
                        // A snapshot is all-or-nothing: never a torn size.
                        assert!(snapshot.len() == 1 || snapshot.len() == 2);
                    }
                })
            })
            .collect();

        for _ in 0..1_000 {
            store.replace(vec![record("x"), record("y")]);
            store.replace(vec![record("z")]);
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
