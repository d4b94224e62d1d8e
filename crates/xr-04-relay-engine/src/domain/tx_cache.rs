//! Bounded set of handled transaction hashes.
//!
//! When an insert pushes the size past capacity the whole set is cleared
//! and only the triggering hash is kept. Older facts can then be seen again
//! after a rescan; the execution chain's replay guard still rejects them.

use shared_types::{short_hex, TxHash};
use std::collections::HashSet;
use tracing::warn;

/// Processed transaction cache.
#[derive(Debug, Clone)]
pub struct ProcessedTxCache {
    entries: HashSet<TxHash>,
    capacity: usize,
    generation: u64,
}

impl ProcessedTxCache {
    /// Empty cache holding at most `capacity` hashes.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashSet::with_capacity(capacity.min(4096)),
            capacity: capacity.max(1),
            generation: 0,
        }
    }

    /// Record a hash. Returns `false` if it was already present.
    pub fn insert(&mut self, tx_hash: TxHash) -> bool {
        if !self.entries.insert(tx_hash) {
            return false;
        }
        if self.entries.len() > self.capacity {
            warn!(
                capacity = self.capacity,
                generation = self.generation,
                tx_hash = %short_hex(&tx_hash),
                "[xr-04] Processed cache full, clearing"
            );
            self.entries.clear();
            self.entries.insert(tx_hash);
            self.generation += 1;
        }
        true
    }

    /// Whether a hash is present.
    pub fn contains(&self, tx_hash: &TxHash) -> bool {
        self.entries.contains(tx_hash)
    }

    /// Number of hashes held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of times the cache has been cleared.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(n: u8) -> TxHash {
        [n; 32]
    }

    #[test]
    fn test_insert_and_contains() {
        let mut cache = ProcessedTxCache::new(4);
        assert!(cache.insert(tx(1)));
        assert!(!cache.insert(tx(1)));
        assert!(cache.contains(&tx(1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overflow_clears_all_but_trigger() {
        let mut cache = ProcessedTxCache::new(3);
        for n in 1..=3 {
            cache.insert(tx(n));
        }
        assert_eq!(cache.len(), 3);

        cache.insert(tx(4));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&tx(4)));
        assert!(!cache.contains(&tx(1)));
        assert_eq!(cache.generation(), 1);
    }

    #[test]
    fn test_duplicate_at_capacity_does_not_clear() {
        let mut cache = ProcessedTxCache::new(2);
        cache.insert(tx(1));
        cache.insert(tx(2));
        assert!(!cache.insert(tx(2)));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.generation(), 0);
    }
}
