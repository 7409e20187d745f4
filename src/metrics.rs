//! Optional classification metrics.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::Serialize;

use crate::types::{Handler, Tier};

/// Classification cache statistics, tracked by the cache itself so they
/// work with metrics disabled.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    #[serde(rename = "hitRatio")]
    pub hit_ratio: f64,
}

#[derive(Debug, Default)]
struct Counters {
    total_classifications: u64,
    cache_hits: u64,
    cache_misses: u64,
    tier_counts: [u64; 4],
    handler_counts: BTreeMap<&'static str, u64>,
}

pub struct MetricsRecorder {
    enabled: AtomicBool,
    counters: Mutex<Counters>,
}

impl MetricsRecorder {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            counters: Mutex::new(Counters::default()),
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Record one classification. `cache_hit` is `None` for uncacheable
    /// decisions.
    pub fn record_classification(&self, tier: Tier, handler: Handler, cache_hit: Option<bool>) {
        if !self.is_enabled() {
            return;
        }
        let mut counters = self.counters.lock().unwrap();
        counters.total_classifications += 1;
        match cache_hit {
            Some(true) => counters.cache_hits += 1,
            Some(false) => counters.cache_misses += 1,
            None => {}
        }
        counters.tier_counts[(tier.level() - 1) as usize] += 1;
        *counters.handler_counts.entry(handler.as_str()).or_insert(0) += 1;
    }

    pub fn reset(&self) {
        *self.counters.lock().unwrap() = Counters::default();
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self.counters.lock().unwrap();
        let lookups = counters.cache_hits + counters.cache_misses;
        MetricsSnapshot {
            enabled: self.is_enabled(),
            total_classifications: counters.total_classifications,
            cache_hits: counters.cache_hits,
            cache_misses: counters.cache_misses,
            cache_hit_ratio: if lookups == 0 {
                0.0
            } else {
                counters.cache_hits as f64 / lookups as f64
            },
            tier_counts: (1..=4)
                .map(|level| {
                    (
                        format!("tier{}", level),
                        counters.tier_counts[level - 1],
                    )
                })
                .collect(),
            handler_counts: counters
                .handler_counts
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub enabled: bool,
    #[serde(rename = "totalClassifications")]
    pub total_classifications: u64,
    #[serde(rename = "cacheHits")]
    pub cache_hits: u64,
    #[serde(rename = "cacheMisses")]
    pub cache_misses: u64,
    #[serde(rename = "cacheHitRatio")]
    pub cache_hit_ratio: f64,
    #[serde(rename = "tierCounts")]
    pub tier_counts: BTreeMap<String, u64>,
    #[serde(rename = "handlerCounts")]
    pub handler_counts: BTreeMap<String, u64>,
}
