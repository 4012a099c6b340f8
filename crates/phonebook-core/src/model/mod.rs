mod contact;

pub use contact::{now_millis, Contact, ContactId, ContactInput, DEFAULT_CATEGORY};
