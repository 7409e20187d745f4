//! Bounded LRU cache for tier decisions.
//!
//! The cache stores decisions without the bound executor and without
//! sandbox strategies; both are derived per call.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::metrics::CacheStats;
use crate::types::{Handler, Tier};

pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// The cached portion of a classification.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedDecision {
    pub tier: Tier,
    pub handler: Handler,
    pub capability: String,
    pub reason: String,
}

struct CacheInner {
    entries: LruCache<String, CachedDecision>,
    hits: u64,
    misses: u64,
}

pub struct ClassificationCache {
    inner: Mutex<CacheInner>,
}

impl ClassificationCache {
    pub fn new(capacity: usize) -> Self {
        let capacity =
            NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap());
        Self {
            inner: Mutex::new(CacheInner {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Look up a decision, promoting the entry on hit.
    pub fn get(&self, key: &str) -> Option<CachedDecision> {
        let mut inner = self.inner.lock().unwrap();
        match inner.entries.get(key).cloned() {
            Some(decision) => {
                inner.hits += 1;
                Some(decision)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Insert a decision, evicting the least-recently-used entry when full.
    pub fn put(&self, key: String, decision: CachedDecision) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.put(key, decision);
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap();
        let total = inner.hits + inner.misses;
        CacheStats {
            size: inner.entries.len(),
            capacity: inner.entries.cap().get(),
            hits: inner.hits,
            misses: inner.misses,
            hit_ratio: if total == 0 {
                0.0
            } else {
                inner.hits as f64 / total as f64
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(capability: &str) -> CachedDecision {
        CachedDecision {
            tier: Tier::Native,
            handler: Handler::Native,
            capability: capability.to_string(),
            reason: "test".to_string(),
        }
    }

    #[test]
    fn test_get_put() {
        let cache = ClassificationCache::new(10);
        assert!(cache.get("echo").is_none());
        cache.put("echo".to_string(), decision("compute"));
        assert_eq!(cache.get("echo").unwrap().capability, "compute");
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let cache = ClassificationCache::new(2);
        cache.put("a".to_string(), decision("1"));
        cache.put("b".to_string(), decision("2"));
        // Touch "a" so "b" becomes the eviction candidate.
        cache.get("a");
        cache.put("c".to_string(), decision("3"));
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_clear_and_len() {
        let cache = ClassificationCache::new(10);
        cache.put("a".to_string(), decision("1"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats_hit_ratio() {
        let cache = ClassificationCache::new(10);
        cache.put("a".to_string(), decision("1"));
        cache.get("a");
        cache.get("a");
        cache.get("missing");
        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_ratio - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.capacity, 10);
    }

    #[test]
    fn test_zero_capacity_falls_back_to_default() {
        let cache = ClassificationCache::new(0);
        assert_eq!(cache.stats().capacity, DEFAULT_CACHE_CAPACITY);
    }
}
