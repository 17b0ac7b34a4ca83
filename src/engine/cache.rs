//! TTL cache of evaluated curve prices.
//!
//! ## What Is Cached
//!
//! The cache stores ciphertext *handles*, never plaintext. A hit returns the
//! exact handle computed earlier, so downstream code cannot tell a cached
//! evaluation from a fresh one except by the compute meter (a hit costs
//! zero units).
//!
//! ## Keying and Expiry
//!
//! Keys are curve fingerprints (plaintext facets only; see
//! [`crate::types::Fingerprint`]). Entries expire by TTL alone, checked
//! lazily on read; an expired entry is evicted by the read that finds it.
//! There is no size bound and no other invalidation path.

use std::collections::HashMap;

use crate::types::{EncU64, Fingerprint};

/// One cached evaluation result.
#[derive(Debug, Clone)]
pub struct CachedPrice {
    /// Ciphertext handle of the evaluated price
    pub value: EncU64,

    /// Unix seconds when the entry was stored
    pub cached_at: u64,
}

/// Hit/miss/occupancy counters, snapshot for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered from the cache
    pub hits: u64,

    /// Reads that missed (absent or expired)
    pub misses: u64,

    /// Live entries
    pub entries: usize,
}

/// Per-venue evaluation cache.
#[derive(Debug, Clone)]
pub struct EvaluationCache {
    entries: HashMap<Fingerprint, CachedPrice>,
    ttl_secs: u64,
    hits: u64,
    misses: u64,
}

impl EvaluationCache {
    /// Create a cache with the given entry lifetime in seconds
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_secs,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a price, applying TTL lazily.
    ///
    /// # Arguments
    ///
    /// * `key` - Curve fingerprint
    /// * `now` - Unix seconds
    ///
    /// # Returns
    ///
    /// * `Some(handle)` - Live entry; bumps the hit counter
    /// * `None` - Absent or expired; bumps the miss counter and evicts an
    ///   expired entry
    pub fn get(&mut self, key: &Fingerprint, now: u64) -> Option<EncU64> {
        match self.entries.get(key) {
            Some(entry) if now.saturating_sub(entry.cached_at) <= self.ttl_secs => {
                self.hits += 1;
                Some(entry.value)
            }
            Some(_) => {
                self.entries.remove(key);
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store a price under a fingerprint, resetting its age
    pub fn insert(&mut self, key: Fingerprint, value: EncU64, now: u64) {
        self.entries.insert(
            key,
            CachedPrice {
                value,
                cached_at: now,
            },
        );
    }

    /// Drop all entries. Counters survive; they are lifetime telemetry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Counter and occupancy snapshot
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    /// Number of live entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Fingerprint, OperationKind};

    fn key(n: u64) -> Fingerprint {
        Fingerprint::for_operation(0, OperationKind::SwapPrice, n, 0, 0)
    }

    #[test]
    fn test_miss_then_hit() {
        let mut cache = EvaluationCache::new(300);
        let k = key(1);

        assert_eq!(cache.get(&k, 100), None);
        cache.insert(k, EncU64::from_handle(42), 100);
        assert_eq!(cache.get(&k, 200), Some(EncU64::from_handle(42)));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_hit_returns_identical_handle() {
        let mut cache = EvaluationCache::new(300);
        let k = key(1);
        cache.insert(k, EncU64::from_handle(7), 0);

        let first = cache.get(&k, 10).unwrap();
        let second = cache.get(&k, 20).unwrap();
        assert_eq!(first.handle(), 7);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ttl_boundary() {
        let mut cache = EvaluationCache::new(300);
        let k = key(1);
        cache.insert(k, EncU64::from_handle(1), 1_000);

        // Age exactly equal to the TTL is still live.
        assert!(cache.get(&k, 1_300).is_some());
        // One second past expires and evicts.
        assert!(cache.get(&k, 1_301).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_expired_read_counts_as_miss() {
        let mut cache = EvaluationCache::new(10);
        let k = key(1);
        cache.insert(k, EncU64::from_handle(1), 0);

        assert!(cache.get(&k, 100).is_none());
        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 0);
    }

    #[test]
    fn test_reinsert_resets_age() {
        let mut cache = EvaluationCache::new(100);
        let k = key(1);
        cache.insert(k, EncU64::from_handle(1), 0);
        cache.insert(k, EncU64::from_handle(2), 90);

        // Would have expired from the first insert's age, but the second
        // insert refreshed it and replaced the handle.
        assert_eq!(cache.get(&k, 150), Some(EncU64::from_handle(2)));
    }

    #[test]
    fn test_clear_keeps_counters() {
        let mut cache = EvaluationCache::new(300);
        let k = key(1);
        cache.insert(k, EncU64::from_handle(1), 0);
        let _ = cache.get(&k, 0);
        cache.clear();

        assert!(cache.is_empty());
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 0);
    }

    #[test]
    fn test_distinct_keys_do_not_collide() {
        let mut cache = EvaluationCache::new(300);
        cache.insert(key(1), EncU64::from_handle(10), 0);
        cache.insert(key(2), EncU64::from_handle(20), 0);

        assert_eq!(cache.get(&key(1), 0), Some(EncU64::from_handle(10)));
        assert_eq!(cache.get(&key(2), 0), Some(EncU64::from_handle(20)));
        assert_eq!(cache.len(), 2);
    }
}
