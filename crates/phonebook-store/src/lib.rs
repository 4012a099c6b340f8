//! Phonebook Store - SQLite persistence for contacts
//!
//! Provides:
//! - Connection setup (pragmas, busy timeout, case-folding SQL function)
//! - A reader connection pool so queries run alongside each other and the writer
//! - Embedded schema migrations with checksums
//! - `SqliteContactStore`, the durable `ContactStore` implementation

pub mod db;
pub mod errors;
pub mod migrations;
pub mod pool;
pub mod repo;

// Re-export key types
pub use db::DbTarget;
pub use errors::Result;
pub use repo::SqliteContactStore;
