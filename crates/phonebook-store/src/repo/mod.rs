//! Repository layer: `ContactStore` backed by SQLite

pub mod sqlite_repo;

pub use sqlite_repo::SqliteContactStore;
