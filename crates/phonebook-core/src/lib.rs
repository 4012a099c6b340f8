//! Phonebook Core - contact model and query contract
//!
//! This crate provides the foundational data structures and operations for
//! the phonebook service, including:
//! - The `Contact` model and the `ContactInput` used to create and update it
//! - Field validation (lengths, required fields, email shape)
//! - The pagination, sorting and keyword-search contract shared by all stores
//! - The `ContactStore` trait and an in-memory implementation
//! - The structured error facility and logging facility

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod queries;
pub mod rules;

#[doc(hidden)]
pub use phonebook_core_types as core_types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, PhonebookError, Result};
pub use model::{Contact, ContactId, ContactInput, DEFAULT_CATEGORY};
pub use ops::{ContactStore, MemoryContactStore};
pub use queries::{Page, PageRequest, Sort, SortDirection, SortField};
