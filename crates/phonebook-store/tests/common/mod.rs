use phonebook_core::{Contact, ContactInput, ContactStore};
use phonebook_store::SqliteContactStore;

/// A migrated, empty in-memory store
#[allow(dead_code)]
pub fn new_store() -> SqliteContactStore {
    SqliteContactStore::open_in_memory().expect("in-memory store should open")
}

#[allow(dead_code)]
pub fn add(store: &dyn ContactStore, name: &str, phone: &str) -> Contact {
    store
        .create(ContactInput::new(name, phone))
        .expect("seed contact should be valid")
}

#[allow(dead_code)]
pub fn add_full(
    store: &dyn ContactStore,
    name: &str,
    phone: &str,
    email: &str,
    category: &str,
) -> Contact {
    store
        .create(
            ContactInput::new(name, phone)
                .with_email(email)
                .with_category(category),
        )
        .expect("seed contact should be valid")
}

#[allow(dead_code)]
pub fn names(contacts: &[Contact]) -> Vec<&str> {
    contacts.iter().map(|c| c.name.as_str()).collect()
}
