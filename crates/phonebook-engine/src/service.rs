//! Contact service with boundary logging and response caching
//!
//! ## Logging Ownership
//!
//! The service owns lifecycle logging for every contact operation:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Stores only use `tracing::debug!()` for internal details. Phone numbers and
//! emails are only ever logged through `Sensitive`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use phonebook_core::queries::normalize_keyword;
use phonebook_core::{
    log_op_end, log_op_error, log_op_start, Contact, ContactId, ContactInput, ContactStore,
    MemoryContactStore, Page, PageRequest, PhonebookError, Result,
};
use phonebook_core_types::Sensitive;
use phonebook_store::SqliteContactStore;

use crate::cache::{CacheKey, Cacheable, ResponseCache};
use crate::metrics::{MetricsSnapshot, ServiceMetrics};

/// Database value that selects a private in-memory SQLite database
pub const SQLITE_IN_MEMORY: &str = ":memory:";

/// Which `ContactStore` implementation to run against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local `MemoryContactStore`
    Memory,
    /// SQLite without a backing file
    SqliteInMemory,
    /// SQLite database file
    SqliteFile(PathBuf),
}

impl StoreBackend {
    /// SQLite backend for a configured database location
    pub fn sqlite(database: &str) -> Self {
        if database.trim() == SQLITE_IN_MEMORY {
            StoreBackend::SqliteInMemory
        } else {
            StoreBackend::SqliteFile(PathBuf::from(database))
        }
    }

    /// Open the store, running migrations for SQLite backends
    ///
    /// # Errors
    /// Fails when the database cannot be opened or migrated.
    pub fn open(&self) -> Result<Arc<dyn ContactStore>> {
        let store: Arc<dyn ContactStore> = match self {
            StoreBackend::Memory => Arc::new(MemoryContactStore::new()),
            StoreBackend::SqliteInMemory => Arc::new(SqliteContactStore::open_in_memory()?),
            StoreBackend::SqliteFile(path) => Arc::new(SqliteContactStore::open(path)?),
        };
        tracing::info!(backend = ?self, "contact store opened");
        Ok(store)
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Contact operations for the HTTP layer
///
/// Reads go through the response cache; every successful mutation clears it.
pub struct ContactService {
    store: Arc<dyn ContactStore>,
    cache: ResponseCache,
    metrics: Arc<ServiceMetrics>,
}

impl ContactService {
    pub fn new(
        store: Arc<dyn ContactStore>,
        cache: ResponseCache,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            store,
            cache,
            metrics,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Cache-aside read; records the hit or miss in the service metrics
    fn read_through<T, F>(&self, key: CacheKey, load: F) -> Result<(T, bool)>
    where
        T: Cacheable,
        F: FnOnce() -> Result<T>,
    {
        let (value, hit) = self
            .cache
            .get_or_load(key, || load().map(T::into_cached))?;
        self.metrics.record_cache(hit);
        let value = T::from_cached(value).ok_or_else(|| PhonebookError::Internal {
            message: "cached value has unexpected type".to_string(),
        })?;
        Ok((value, hit))
    }

    /// Create a contact
    ///
    /// # Errors
    /// `Validation`, `DuplicatePhoneNumber`, `DuplicateEmail` or a storage error.
    pub fn create(&self, input: ContactInput) -> Result<Contact> {
        log_op_start!(
            "create_contact",
            phone_number = %Sensitive::phone(input.phone_number.as_str())
        );
        let start = Instant::now();

        let contact = self.store.create(input).map_err(|e| {
            log_op_error!("create_contact", &e, duration_ms = elapsed_ms(start));
            e
        })?;

        self.cache.invalidate_all();
        self.metrics.record_created();
        log_op_end!(
            "create_contact",
            duration_ms = elapsed_ms(start),
            contact_id = contact.id
        );
        Ok(contact)
    }

    /// Fetch one contact; absence is not an error
    ///
    /// # Errors
    /// Storage errors only.
    pub fn get(&self, id: ContactId) -> Result<Option<Contact>> {
        log_op_start!("get_contact", contact_id = id);
        let start = Instant::now();

        let (contact, hit) = self
            .read_through(CacheKey::Contact(id), || self.store.get_by_id(id))
            .map_err(|e| {
                log_op_error!("get_contact", &e, duration_ms = elapsed_ms(start), contact_id = id);
                e
            })?;

        log_op_end!(
            "get_contact",
            duration_ms = elapsed_ms(start),
            contact_id = id,
            found = contact.is_some(),
            cache_hit = hit
        );
        Ok(contact)
    }

    /// # Errors
    /// Storage errors only.
    pub fn list(&self, request: &PageRequest) -> Result<Page<Contact>> {
        log_op_start!("list_contacts", page = %request.cache_repr());
        let start = Instant::now();

        let (page, hit) = self
            .read_through(CacheKey::List(*request), || self.store.list(request))
            .map_err(|e| {
                log_op_error!("list_contacts", &e, duration_ms = elapsed_ms(start));
                e
            })?;

        log_op_end!(
            "list_contacts",
            duration_ms = elapsed_ms(start),
            result_count = page.number_of_elements(),
            total_elements = page.total_elements,
            cache_hit = hit
        );
        Ok(page)
    }

    /// Replace every field of an existing contact
    ///
    /// # Errors
    /// `NotFound`, `Validation`, `DuplicatePhoneNumber`, `DuplicateEmail` or a
    /// storage error.
    pub fn update(&self, id: ContactId, input: ContactInput) -> Result<Contact> {
        log_op_start!("update_contact", contact_id = id);
        let start = Instant::now();

        let contact = self.store.update(id, input).map_err(|e| {
            log_op_error!("update_contact", &e, duration_ms = elapsed_ms(start), contact_id = id);
            e
        })?;

        self.cache.invalidate_all();
        log_op_end!("update_contact", duration_ms = elapsed_ms(start), contact_id = id);
        Ok(contact)
    }

    /// # Errors
    /// `NotFound` or a storage error.
    pub fn delete(&self, id: ContactId) -> Result<()> {
        log_op_start!("delete_contact", contact_id = id);
        let start = Instant::now();

        self.store.delete(id).map_err(|e| {
            log_op_error!("delete_contact", &e, duration_ms = elapsed_ms(start), contact_id = id);
            e
        })?;

        self.cache.invalidate_all();
        log_op_end!("delete_contact", duration_ms = elapsed_ms(start), contact_id = id);
        Ok(())
    }

    /// Delete every listed contact that exists, returning how many were removed
    ///
    /// # Errors
    /// Storage errors only; unknown ids are skipped.
    pub fn delete_batch(&self, ids: &[ContactId]) -> Result<u64> {
        log_op_start!("delete_contacts_batch", requested = ids.len());
        let start = Instant::now();

        let removed = self.store.delete_batch(ids).map_err(|e| {
            log_op_error!("delete_contacts_batch", &e, duration_ms = elapsed_ms(start));
            e
        })?;

        self.cache.invalidate_all();
        log_op_end!(
            "delete_contacts_batch",
            duration_ms = elapsed_ms(start),
            result_count = removed
        );
        Ok(removed)
    }

    /// Relevance-ranked keyword search; a blank keyword lists everything
    ///
    /// # Errors
    /// Storage errors only.
    pub fn search(&self, keyword: &str, request: &PageRequest) -> Result<Page<Contact>> {
        let keyword = normalize_keyword(keyword).unwrap_or_default();
        log_op_start!("search_contacts", keyword_len = keyword.chars().count());
        let start = Instant::now();
        self.metrics.record_searched();

        let key = CacheKey::Search {
            keyword: keyword.to_string(),
            page: *request,
        };
        let (page, hit) = self
            .read_through(key, || self.store.search(keyword, request))
            .map_err(|e| {
                log_op_error!("search_contacts", &e, duration_ms = elapsed_ms(start));
                e
            })?;

        log_op_end!(
            "search_contacts",
            duration_ms = elapsed_ms(start),
            result_count = page.number_of_elements(),
            total_elements = page.total_elements,
            cache_hit = hit
        );
        Ok(page)
    }

    /// # Errors
    /// Storage errors only.
    pub fn list_by_category(&self, category: &str, request: &PageRequest) -> Result<Page<Contact>> {
        log_op_start!("list_contacts_by_category", category = category);
        let start = Instant::now();

        let key = CacheKey::Category {
            category: category.to_string(),
            page: *request,
        };
        let (page, hit) = self
            .read_through(key, || self.store.list_by_category(category, request))
            .map_err(|e| {
                log_op_error!("list_contacts_by_category", &e, duration_ms = elapsed_ms(start));
                e
            })?;

        log_op_end!(
            "list_contacts_by_category",
            duration_ms = elapsed_ms(start),
            result_count = page.number_of_elements(),
            total_elements = page.total_elements,
            cache_hit = hit
        );
        Ok(page)
    }

    /// # Errors
    /// Storage errors only.
    pub fn statistics(&self) -> Result<BTreeMap<String, u64>> {
        log_op_start!("contact_statistics");
        let start = Instant::now();

        let (stats, hit) = self
            .read_through(CacheKey::Statistics, || self.store.statistics())
            .map_err(|e| {
                log_op_error!("contact_statistics", &e, duration_ms = elapsed_ms(start));
                e
            })?;

        log_op_end!(
            "contact_statistics",
            duration_ms = elapsed_ms(start),
            result_count = stats.len(),
            cache_hit = hit
        );
        Ok(stats)
    }

    /// # Errors
    /// Storage errors only.
    pub fn exists_by_phone_number(
        &self,
        phone_number: &str,
        exclude_id: Option<ContactId>,
    ) -> Result<bool> {
        log_op_start!(
            "check_phone_number",
            phone_number = %Sensitive::phone(phone_number)
        );
        let start = Instant::now();

        let exists = self
            .store
            .exists_by_phone_number(phone_number, exclude_id)
            .map_err(|e| {
                log_op_error!("check_phone_number", &e, duration_ms = elapsed_ms(start));
                e
            })?;

        log_op_end!("check_phone_number", duration_ms = elapsed_ms(start), exists = exists);
        Ok(exists)
    }

    /// # Errors
    /// Storage errors only.
    pub fn exists_by_email(&self, email: &str, exclude_id: Option<ContactId>) -> Result<bool> {
        log_op_start!("check_email", email = %Sensitive::email(email));
        let start = Instant::now();

        let exists = self.store.exists_by_email(email, exclude_id).map_err(|e| {
            log_op_error!("check_email", &e, duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!("check_email", duration_ms = elapsed_ms(start), exists = exists);
        Ok(exists)
    }

    /// # Errors
    /// Storage errors only.
    pub fn find_by_phone_number(&self, phone_number: &str) -> Result<Option<Contact>> {
        log_op_start!(
            "find_by_phone_number",
            phone_number = %Sensitive::phone(phone_number)
        );
        let start = Instant::now();

        let contact = self.store.find_by_phone_number(phone_number).map_err(|e| {
            log_op_error!("find_by_phone_number", &e, duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!(
            "find_by_phone_number",
            duration_ms = elapsed_ms(start),
            found = contact.is_some()
        );
        Ok(contact)
    }

    /// # Errors
    /// Storage errors only.
    pub fn find_by_email(&self, email: &str) -> Result<Option<Contact>> {
        log_op_start!("find_by_email", email = %Sensitive::email(email));
        let start = Instant::now();

        let contact = self.store.find_by_email(email).map_err(|e| {
            log_op_error!("find_by_email", &e, duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!(
            "find_by_email",
            duration_ms = elapsed_ms(start),
            found = contact.is_some()
        );
        Ok(contact)
    }

    /// The `limit` most recently created contacts, newest first
    ///
    /// # Errors
    /// Storage errors only.
    pub fn recent(&self, limit: usize) -> Result<Vec<Contact>> {
        log_op_start!("recent_contacts", limit = limit);
        let start = Instant::now();

        let contacts = self.store.recent(limit).map_err(|e| {
            log_op_error!("recent_contacts", &e, duration_ms = elapsed_ms(start));
            e
        })?;

        log_op_end!(
            "recent_contacts",
            duration_ms = elapsed_ms(start),
            result_count = contacts.len()
        );
        Ok(contacts)
    }

    /// # Errors
    /// Storage errors only.
    pub fn count(&self) -> Result<u64> {
        self.store.count()
    }

    /// Pre-populate the statistics entry so the first request is a hit
    ///
    /// # Errors
    /// Storage errors only.
    pub fn warm_up(&self) -> Result<()> {
        log_op_start!("warm_up_cache");
        let start = Instant::now();

        let key = CacheKey::Statistics;
        self.cache
            .get_or_load(key, || self.store.statistics().map(Cacheable::into_cached))
            .map_err(|e| {
                log_op_error!("warm_up_cache", &e, duration_ms = elapsed_ms(start));
                e
            })?;

        log_op_end!("warm_up_cache", duration_ms = elapsed_ms(start));
        Ok(())
    }
}
