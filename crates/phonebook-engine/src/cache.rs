//! Response cache for read operations
//!
//! Entries are tagged with the cache generation current when their load
//! began. `invalidate_all` bumps the generation before clearing, so a load
//! that raced with a mutation can never be served afterwards.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use phonebook_core::{Contact, ContactId, Page, PageRequest, Result};

/// Time-to-live applied when none is configured
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Canonical identity of a cacheable read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Contact(ContactId),
    List(PageRequest),
    /// `keyword` is already trimmed
    Search { keyword: String, page: PageRequest },
    Category { category: String, page: PageRequest },
    Statistics,
}

/// Cached result of a read
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Contact(Option<Contact>),
    Page(Page<Contact>),
    Statistics(BTreeMap<String, u64>),
}

/// Conversion between a typed read result and its cached form
pub trait Cacheable: Sized {
    fn into_cached(self) -> CachedValue;
    /// `None` when `value` holds a different kind of result
    fn from_cached(value: CachedValue) -> Option<Self>;
}

impl Cacheable for Option<Contact> {
    fn into_cached(self) -> CachedValue {
        CachedValue::Contact(self)
    }

    fn from_cached(value: CachedValue) -> Option<Self> {
        match value {
            CachedValue::Contact(contact) => Some(contact),
            _ => None,
        }
    }
}

impl Cacheable for Page<Contact> {
    fn into_cached(self) -> CachedValue {
        CachedValue::Page(self)
    }

    fn from_cached(value: CachedValue) -> Option<Self> {
        match value {
            CachedValue::Page(page) => Some(page),
            _ => None,
        }
    }
}

impl Cacheable for BTreeMap<String, u64> {
    fn into_cached(self) -> CachedValue {
        CachedValue::Statistics(self)
    }

    fn from_cached(value: CachedValue) -> Option<Self> {
        match value {
            CachedValue::Statistics(stats) => Some(stats),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Entry {
    value: CachedValue,
    generation: u64,
    stored_at: Instant,
}

/// Concurrent TTL cache keyed by [`CacheKey`]
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<CacheKey, Entry>,
    ttl: Duration,
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl ResponseCache {
    /// A cache whose entries live for `ttl`; a zero TTL disables caching
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Return the fresh cached value for `key`, or run `loader` and cache its
    /// result
    ///
    /// Only `Ok` results are cached. The boolean is `true` on a hit.
    ///
    /// # Errors
    /// Propagates the loader's error unchanged.
    pub fn get_or_load<F>(&self, key: CacheKey, loader: F) -> Result<(CachedValue, bool)>
    where
        F: FnOnce() -> Result<CachedValue>,
    {
        if let Some(value) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok((value, true));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let generation = self.generation.load(Ordering::SeqCst);
        let value = loader()?;
        if self.is_enabled() {
            self.entries.insert(
                key,
                Entry {
                    value: value.clone(),
                    generation,
                    stored_at: Instant::now(),
                },
            );
        }
        Ok((value, false))
    }

    /// Fresh value for `key`, if any; stale entries are dropped on sight
    pub fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        if !self.is_enabled() {
            return None;
        }
        let current = self.generation.load(Ordering::SeqCst);
        let fresh = {
            let entry = self.entries.get(key)?;
            if entry.generation == current && entry.stored_at.elapsed() < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        };
        if fresh.is_none() {
            self.entries
                .remove_if(key, |_, e| e.generation != current || e.stored_at.elapsed() >= self.ttl);
        }
        fresh
    }

    /// Drop every entry
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phonebook_core::PhonebookError;

    fn stats(total: u64) -> CachedValue {
        let mut map = BTreeMap::new();
        map.insert("total".to_string(), total);
        CachedValue::Statistics(map)
    }

    #[test]
    fn test_second_read_is_a_hit() {
        let cache = ResponseCache::default();

        let (_, hit) = cache.get_or_load(CacheKey::Statistics, || Ok(stats(1))).unwrap();
        assert!(!hit);
        let (value, hit) = cache
            .get_or_load(CacheKey::Statistics, || Ok(stats(2)))
            .unwrap();
        assert!(hit);
        assert_eq!(value, stats(1));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = ResponseCache::default();

        let err = cache
            .get_or_load(CacheKey::Contact(1), || {
                Err(PhonebookError::Internal {
                    message: "boom".to_string(),
                })
            })
            .unwrap_err();
        assert!(matches!(err, PhonebookError::Internal { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_all_clears() {
        let cache = ResponseCache::default();
        cache.get_or_load(CacheKey::Statistics, || Ok(stats(1))).unwrap();

        cache.invalidate_all();

        assert!(cache.get(&CacheKey::Statistics).is_none());
        let (value, hit) = cache
            .get_or_load(CacheKey::Statistics, || Ok(stats(5)))
            .unwrap();
        assert!(!hit);
        assert_eq!(value, stats(5));
    }

    #[test]
    fn test_load_racing_invalidation_is_not_served() {
        let cache = ResponseCache::default();

        // Invalidation lands while the loader is running
        cache
            .get_or_load(CacheKey::Statistics, || {
                cache.invalidate_all();
                Ok(stats(1))
            })
            .unwrap();

        assert!(cache.get(&CacheKey::Statistics).is_none());
    }

    #[test]
    fn test_zero_ttl_disables_caching() {
        let cache = ResponseCache::new(Duration::ZERO);

        cache.get_or_load(CacheKey::Statistics, || Ok(stats(1))).unwrap();
        let (value, hit) = cache
            .get_or_load(CacheKey::Statistics, || Ok(stats(2)))
            .unwrap();

        assert!(!hit);
        assert_eq!(value, stats(2));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_misses() {
        let cache = ResponseCache::new(Duration::from_millis(20));
        cache.get_or_load(CacheKey::Statistics, || Ok(stats(1))).unwrap();

        std::thread::sleep(Duration::from_millis(40));

        let (value, hit) = cache
            .get_or_load(CacheKey::Statistics, || Ok(stats(2)))
            .unwrap();
        assert!(!hit);
        assert_eq!(value, stats(2));
    }

    #[test]
    fn test_keys_distinguish_arguments() {
        let a = CacheKey::Search {
            keyword: "ann".to_string(),
            page: PageRequest::Unpaged,
        };
        let b = CacheKey::Search {
            keyword: "ann".to_string(),
            page: PageRequest::of(0, 10).unwrap(),
        };
        assert_ne!(a, b);
    }
}
