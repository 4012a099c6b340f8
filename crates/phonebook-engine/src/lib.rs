//! Phonebook Engine - service orchestration
//!
//! Sits between the HTTP layer and a `ContactStore`:
//! - `ContactService` owns lifecycle logging for every operation
//! - `ResponseCache` serves repeated reads (cache-aside, wholesale invalidation)
//! - `ServiceMetrics` counts creates, searches and cache traffic

pub mod cache;
pub mod metrics;
pub mod service;

pub use cache::{CacheKey, Cacheable, CachedValue, ResponseCache, DEFAULT_CACHE_TTL};
pub use metrics::{MetricsSnapshot, ServiceMetrics};
pub use service::{ContactService, StoreBackend};
