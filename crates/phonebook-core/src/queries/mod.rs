//! Query contract shared by every `ContactStore` implementation
//!
//! Stores are free to evaluate queries however they like (SQL, in-memory
//! filters), but results must agree with the functions in this module.

pub mod page;
pub mod search;
pub mod statistics;

pub use page::{Page, PageRequest, Sort, SortDirection, SortField, DEFAULT_PAGE_SIZE};
pub use search::{compare_by_relevance, matches_keyword, normalize_keyword, SearchTier};
pub use statistics::{build_statistics, TOTAL_KEY};
