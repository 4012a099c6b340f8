use std::sync::Arc;
use std::time::Duration;

use phonebook_core::{ContactStore, MemoryContactStore};
use phonebook_engine::{ContactService, ResponseCache, ServiceMetrics, StoreBackend};

/// Service over a fresh in-memory store with the default cache TTL
#[allow(dead_code)]
pub fn memory_service() -> ContactService {
    let store: Arc<dyn ContactStore> = Arc::new(MemoryContactStore::new());
    ContactService::new(store, ResponseCache::default(), Arc::new(ServiceMetrics::new()))
}

/// Service over a fresh in-memory SQLite database
#[allow(dead_code)]
pub fn sqlite_service() -> ContactService {
    let store = StoreBackend::SqliteInMemory.open().expect("sqlite store opens");
    ContactService::new(store, ResponseCache::default(), Arc::new(ServiceMetrics::new()))
}

/// Service with caching turned off
#[allow(dead_code)]
pub fn uncached_service() -> ContactService {
    let store: Arc<dyn ContactStore> = Arc::new(MemoryContactStore::new());
    ContactService::new(
        store,
        ResponseCache::new(Duration::ZERO),
        Arc::new(ServiceMetrics::new()),
    )
}
