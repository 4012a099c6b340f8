//! Service counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Monotonic service counters, safe to share across threads
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    contacts_created: AtomicU64,
    contacts_searched: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

/// Point-in-time copy of [`ServiceMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub contacts_created: u64,
    pub contacts_searched: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&self) {
        self.contacts_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_searched(&self) {
        self.contacts_searched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache(&self, hit: bool) {
        let counter = if hit {
            &self.cache_hits
        } else {
            &self.cache_misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            contacts_created: self.contacts_created.load(Ordering::Relaxed),
            contacts_searched: self.contacts_searched.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_records() {
        let metrics = ServiceMetrics::new();
        metrics.record_created();
        metrics.record_searched();
        metrics.record_searched();
        metrics.record_cache(true);
        metrics.record_cache(false);
        metrics.record_cache(false);

        let snap = metrics.snapshot();
        assert_eq!(snap.contacts_created, 1);
        assert_eq!(snap.contacts_searched, 2);
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.cache_misses, 2);
    }
}
