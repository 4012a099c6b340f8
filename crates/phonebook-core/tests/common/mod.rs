use phonebook_core::{Contact, ContactInput, ContactStore, MemoryContactStore};

/// Create a new empty store for testing
#[allow(dead_code)]
pub fn new_store() -> MemoryContactStore {
    MemoryContactStore::new()
}

/// Insert a contact with just a name and phone number
#[allow(dead_code)]
pub fn add(store: &dyn ContactStore, name: &str, phone: &str) -> Contact {
    store
        .create(ContactInput::new(name, phone))
        .expect("seed contact should be valid")
}

/// Insert a contact with email and category
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

/// The three-contact fixture used by most scenario tests
///
/// 张三 / 13800138001 / zhangsan@example.com / family
/// 李四 / 13900139002 / lisi@company.com / business
/// 王五 / 13700137003 / wangwu@gmail.com / friend
#[allow(dead_code)]
pub fn seed_three(store: &dyn ContactStore) -> Vec<Contact> {
    vec![
        add_full(store, "张三", "13800138001", "zhangsan@example.com", "family"),
        add_full(store, "李四", "13900139002", "lisi@company.com", "business"),
        add_full(store, "王五", "13700137003", "wangwu@gmail.com", "friend"),
    ]
}

#[allow(dead_code)]
pub fn names(contacts: &[Contact]) -> Vec<&str> {
    contacts.iter().map(|c| c.name.as_str()).collect()
}
