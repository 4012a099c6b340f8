use std::collections::BTreeMap;

use crate::errors::Result;
use crate::model::{Contact, ContactId, ContactInput};
use crate::queries::{Page, PageRequest};

/// Durable collection of contacts and the fixed set of queries over it
///
/// Implementations must make each operation atomic with respect to the
/// phone-number and email uniqueness invariants: the existence check and the
/// write happen inside one critical section.
///
/// Read misses are `Ok(None)`; mutation misses are `Err(NotFound)`.
pub trait ContactStore: Send + Sync {
    /// Validate and insert a new contact, assigning its id and timestamps
    ///
    /// # Errors
    /// * `Validation` - a field is blank, too long or malformed
    /// * `DuplicatePhoneNumber` - another contact has this phone number
    /// * `DuplicateEmail` - another contact has this (non-blank) email
    fn create(&self, input: ContactInput) -> Result<Contact>;

    /// Look up a contact by id
    ///
    /// # Errors
    /// Only backend failures; a missing id is `Ok(None)`.
    fn get_by_id(&self, id: ContactId) -> Result<Option<Contact>>;

    /// List contacts, either one sorted page or everything in id order
    ///
    /// # Errors
    /// Only backend failures.
    fn list(&self, request: &PageRequest) -> Result<Page<Contact>>;

    /// Replace every mutable field of an existing contact
    ///
    /// # Errors
    /// * `NotFound` - no contact has this id
    /// * `Validation`, `DuplicatePhoneNumber`, `DuplicateEmail` - as for `create`,
    ///   with the uniqueness checks excluding `id` itself
    fn update(&self, id: ContactId, input: ContactInput) -> Result<Contact>;

    /// Permanently remove a contact
    ///
    /// # Errors
    /// `NotFound` if no contact has this id.
    fn delete(&self, id: ContactId) -> Result<()>;

    /// Remove every listed contact, skipping ids that do not exist
    ///
    /// Returns how many contacts were removed.
    ///
    /// # Errors
    /// Only backend failures.
    fn delete_batch(&self, ids: &[ContactId]) -> Result<u64>;

    /// Keyword search over name, phone number and email, ranked by relevance
    ///
    /// A blank keyword lists everything.
    ///
    /// # Errors
    /// Only backend failures.
    fn search(&self, keyword: &str, request: &PageRequest) -> Result<Page<Contact>>;

    /// Contacts in exactly this category, ordered by name
    ///
    /// # Errors
    /// Only backend failures.
    fn list_by_category(&self, category: &str, request: &PageRequest) -> Result<Page<Contact>>;

    /// Whether a contact other than `exclude_id` has this phone number
    ///
    /// # Errors
    /// Only backend failures.
    fn exists_by_phone_number(&self, phone_number: &str, exclude_id: Option<ContactId>)
        -> Result<bool>;

    /// Whether a contact other than `exclude_id` has this email
    ///
    /// Always `false` for a blank email.
    ///
    /// # Errors
    /// Only backend failures.
    fn exists_by_email(&self, email: &str, exclude_id: Option<ContactId>) -> Result<bool>;

    /// Count per non-blank category plus a `total` entry
    ///
    /// # Errors
    /// Only backend failures.
    fn statistics(&self) -> Result<BTreeMap<String, u64>>;

    /// Exact phone number lookup
    ///
    /// # Errors
    /// Only backend failures.
    fn find_by_phone_number(&self, phone_number: &str) -> Result<Option<Contact>>;

    /// Exact email lookup; a blank email finds nothing
    ///
    /// # Errors
    /// Only backend failures.
    fn find_by_email(&self, email: &str) -> Result<Option<Contact>>;

    /// The `limit` most recently created contacts, newest first
    ///
    /// # Errors
    /// Only backend failures.
    fn recent(&self, limit: usize) -> Result<Vec<Contact>>;

    /// Number of stored contacts
    ///
    /// # Errors
    /// Only backend failures.
    fn count(&self) -> Result<u64>;
}
