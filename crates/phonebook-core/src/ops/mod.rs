pub mod memory_store;
pub mod store;

pub use memory_store::MemoryContactStore;
pub use store::ContactStore;
