use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::store::ContactStore;
use crate::errors::{PhonebookError, Result};
use crate::model::{now_millis, Contact, ContactId, ContactInput};
use crate::queries::{
    build_statistics, compare_by_relevance, matches_keyword, normalize_keyword, Page, PageRequest,
    Sort, SortField,
};
use crate::rules::validate_contact_input;

#[derive(Debug, Default)]
struct Inner {
    /// Keyed by id, so iteration order is natural (insertion) order
    contacts: BTreeMap<ContactId, Contact>,
    last_id: ContactId,
}

impl Inner {
    fn phone_taken(&self, phone_number: &str, exclude_id: Option<ContactId>) -> bool {
        self.contacts
            .values()
            .any(|c| c.phone_number == phone_number && Some(c.id) != exclude_id)
    }

    fn email_taken(&self, email: &str, exclude_id: Option<ContactId>) -> bool {
        if email.trim().is_empty() {
            return false;
        }
        self.contacts
            .values()
            .any(|c| c.email.as_deref() == Some(email) && Some(c.id) != exclude_id)
    }

    fn sorted(&self, sort: &Sort) -> Vec<Contact> {
        let mut all: Vec<Contact> = self.contacts.values().cloned().collect();
        all.sort_by(|a, b| sort.compare(a, b));
        all
    }
}

/// In-memory contact store
///
/// All state sits behind one `RwLock`: reads share the read guard, and every
/// mutation performs its uniqueness checks and its write under a single write
/// guard. Ids are never reused, even after deletion.
#[derive(Debug, Default)]
pub struct MemoryContactStore {
    inner: RwLock<Inner>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContactStore for MemoryContactStore {
    fn create(&self, input: ContactInput) -> Result<Contact> {
        validate_contact_input(&input)?;

        let mut inner = self.inner.write();
        if inner.phone_taken(&input.phone_number, None) {
            return Err(PhonebookError::DuplicatePhoneNumber {
                phone_number: input.phone_number,
            });
        }
        if let Some(email) = input.effective_email() {
            if inner.email_taken(email, None) {
                return Err(PhonebookError::DuplicateEmail {
                    email: email.to_string(),
                });
            }
        }

        inner.last_id += 1;
        let contact = Contact::from_input(inner.last_id, input, now_millis());
        inner.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    fn get_by_id(&self, id: ContactId) -> Result<Option<Contact>> {
        Ok(self.inner.read().contacts.get(&id).cloned())
    }

    fn list(&self, request: &PageRequest) -> Result<Page<Contact>> {
        let inner = self.inner.read();
        let ordered = match request.sort() {
            Some(sort) => inner.sorted(&sort),
            None => inner.contacts.values().cloned().collect(),
        };
        Ok(Page::from_ordered(ordered, request))
    }

    fn update(&self, id: ContactId, input: ContactInput) -> Result<Contact> {
        validate_contact_input(&input)?;

        let mut inner = self.inner.write();
        let existing = inner
            .contacts
            .get(&id)
            .ok_or(PhonebookError::NotFound { id })?;

        if existing.phone_number != input.phone_number
            && inner.phone_taken(&input.phone_number, Some(id))
        {
            return Err(PhonebookError::DuplicatePhoneNumber {
                phone_number: input.phone_number,
            });
        }
        if let Some(email) = input.effective_email() {
            if existing.email.as_deref() != Some(email) && inner.email_taken(email, Some(id)) {
                return Err(PhonebookError::DuplicateEmail {
                    email: email.to_string(),
                });
            }
        }

        let contact = inner
            .contacts
            .get_mut(&id)
            .ok_or(PhonebookError::NotFound { id })?;
        contact.apply_input(input, now_millis());
        Ok(contact.clone())
    }

    fn delete(&self, id: ContactId) -> Result<()> {
        self.inner
            .write()
            .contacts
            .remove(&id)
            .map(|_| ())
            .ok_or(PhonebookError::NotFound { id })
    }

    fn delete_batch(&self, ids: &[ContactId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut inner = self.inner.write();
        let removed = ids
            .iter()
            .filter(|id| inner.contacts.remove(id).is_some())
            .count();
        Ok(removed as u64)
    }

    fn search(&self, keyword: &str, request: &PageRequest) -> Result<Page<Contact>> {
        let Some(keyword) = normalize_keyword(keyword) else {
            return self.list(request);
        };

        let inner = self.inner.read();
        let mut hits: Vec<Contact> = inner
            .contacts
            .values()
            .filter(|c| matches_keyword(c, keyword))
            .cloned()
            .collect();
        hits.sort_by(|a, b| compare_by_relevance(a, b, keyword));
        Ok(Page::from_ordered(hits, request))
    }

    fn list_by_category(&self, category: &str, request: &PageRequest) -> Result<Page<Contact>> {
        let by_name = Sort::asc(SortField::Name);
        let inner = self.inner.read();
        let mut hits: Vec<Contact> = inner
            .contacts
            .values()
            .filter(|c| c.category == category)
            .cloned()
            .collect();
        hits.sort_by(|a, b| by_name.compare(a, b));
        Ok(Page::from_ordered(hits, request))
    }

    fn exists_by_phone_number(
        &self,
        phone_number: &str,
        exclude_id: Option<ContactId>,
    ) -> Result<bool> {
        Ok(self.inner.read().phone_taken(phone_number, exclude_id))
    }

    fn exists_by_email(&self, email: &str, exclude_id: Option<ContactId>) -> Result<bool> {
        Ok(self.inner.read().email_taken(email, exclude_id))
    }

    fn statistics(&self) -> Result<BTreeMap<String, u64>> {
        let inner = self.inner.read();
        let mut per_category: BTreeMap<String, u64> = BTreeMap::new();
        for contact in inner.contacts.values() {
            *per_category.entry(contact.category.clone()).or_insert(0) += 1;
        }
        Ok(build_statistics(inner.contacts.len() as u64, per_category))
    }

    fn find_by_phone_number(&self, phone_number: &str) -> Result<Option<Contact>> {
        Ok(self
            .inner
            .read()
            .contacts
            .values()
            .find(|c| c.phone_number == phone_number)
            .cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Contact>> {
        if email.trim().is_empty() {
            return Ok(None);
        }
        Ok(self
            .inner
            .read()
            .contacts
            .values()
            .find(|c| c.email.as_deref() == Some(email))
            .cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Contact>> {
        let mut all: Vec<Contact> = self.inner.read().contacts.values().cloned().collect();
        // Same-millisecond inserts: newer ids first
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        all.truncate(limit);
        Ok(all)
    }

    fn count(&self) -> Result<u64> {
        Ok(self.inner.read().contacts.len() as u64)
    }
}
