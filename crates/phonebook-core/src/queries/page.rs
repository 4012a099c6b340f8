use std::cmp::Ordering;
use std::str::FromStr;

use crate::errors::{PhonebookError, Result};
use crate::model::Contact;

/// Page size used when a caller asks for a page without giving a size
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Contact attribute a listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Name,
    PhoneNumber,
    Email,
    Address,
    Category,
    Notes,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Column holding this attribute in the `contacts` table
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::PhoneNumber => "phone_number",
            SortField::Email => "email",
            SortField::Address => "address",
            SortField::Category => "category",
            SortField::Notes => "notes",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// Wire name used in query strings and cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::PhoneNumber => "phoneNumber",
            SortField::Email => "email",
            SortField::Address => "address",
            SortField::Category => "category",
            SortField::Notes => "notes",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    /// Compare two contacts on this attribute alone (ascending)
    ///
    /// Absent optional values sort before present ones.
    pub fn compare(&self, a: &Contact, b: &Contact) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::PhoneNumber => a.phone_number.cmp(&b.phone_number),
            SortField::Email => a.email.cmp(&b.email),
            SortField::Address => a.address.cmp(&b.address),
            SortField::Category => a.category.cmp(&b.category),
            SortField::Notes => a.notes.cmp(&b.notes),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

impl FromStr for SortField {
    type Err = PhonebookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "phoneNumber" | "phone_number" => Ok(SortField::PhoneNumber),
            "email" => Ok(SortField::Email),
            "address" => Ok(SortField::Address),
            "category" => Ok(SortField::Category),
            "notes" => Ok(SortField::Notes),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(PhonebookError::validation(
                "sortBy",
                format!("unknown sort field '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = PhonebookError;

    /// Case-insensitive `asc`/`desc`
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(PhonebookError::validation(
                "sortDir",
                format!("expected 'asc' or 'desc', got '{}'", other),
            )),
        }
    }
}

/// Sort order for a listing
///
/// Ties on `field` are always broken by ascending id so paging is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    pub fn compare(&self, a: &Contact, b: &Contact) -> Ordering {
        let primary = match self.direction {
            SortDirection::Asc => self.field.compare(a, b),
            SortDirection::Desc => self.field.compare(b, a),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self::asc(SortField::Name)
    }
}

/// Which slice of a result set to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRequest {
    /// Every record, in natural (id) order
    Unpaged,
    /// One zero-indexed page
    Paged { page: usize, size: usize, sort: Sort },
}

impl PageRequest {
    /// Page `page` of `size` records, sorted by name
    ///
    /// # Errors
    /// Returns a validation error when `size` is zero.
    pub fn of(page: usize, size: usize) -> Result<Self> {
        Self::sorted(page, size, Sort::default())
    }

    /// Page `page` of `size` records in the given order
    ///
    /// # Errors
    /// Returns a validation error when `size` is zero.
    pub fn sorted(page: usize, size: usize, sort: Sort) -> Result<Self> {
        if size == 0 {
            return Err(PhonebookError::validation("size", "must be at least 1"));
        }
        Ok(PageRequest::Paged { page, size, sort })
    }

    pub fn is_paged(&self) -> bool {
        matches!(self, PageRequest::Paged { .. })
    }

    /// Index of the first record on this page
    pub fn offset(&self) -> usize {
        match self {
            PageRequest::Unpaged => 0,
            PageRequest::Paged { page, size, .. } => page.saturating_mul(*size),
        }
    }

    pub fn sort(&self) -> Option<Sort> {
        match self {
            PageRequest::Unpaged => None,
            PageRequest::Paged { sort, .. } => Some(*sort),
        }
    }

    /// Canonical text form used in cache keys
    pub fn cache_repr(&self) -> String {
        match self {
            PageRequest::Unpaged => "unpaged".to_string(),
            PageRequest::Paged { page, size, sort } => format!(
                "{}_{}_{}:{}",
                page,
                size,
                sort.field.as_str(),
                sort.direction.as_sql()
            ),
        }
    }
}

/// One page of a result set plus enough to navigate the rest
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page index
    pub number: usize,
    /// Requested page size (the content length for unpaged results)
    pub size: usize,
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Assemble a page whose content was already sliced by the store
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        match request {
            PageRequest::Unpaged => Self {
                size: content.len(),
                content,
                number: 0,
                total_elements,
            },
            PageRequest::Paged { page, size, .. } => Self {
                content,
                number: *page,
                size: *size,
                total_elements,
            },
        }
    }

    /// Slice an already-ordered, complete result set
    pub fn from_ordered(all: Vec<T>, request: &PageRequest) -> Self {
        let total = all.len() as u64;
        let content = match request {
            PageRequest::Unpaged => all,
            PageRequest::Paged { size, .. } => all
                .into_iter()
                .skip(request.offset())
                .take(*size)
                .collect(),
        };
        Self::new(content, request, total)
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            1
        } else {
            self.total_elements.div_ceil(self.size as u64)
        }
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn has_next(&self) -> bool {
        (self.number as u64).saturating_add(1) < self.total_pages()
    }

    pub fn is_first(&self) -> bool {
        !self.has_previous()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Transform the content while keeping the paging metadata
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_is_rejected() {
        assert!(matches!(
            PageRequest::of(0, 0),
            Err(PhonebookError::Validation { field, .. }) if field == "size"
        ));
    }

    #[test]
    fn test_page_navigation_flags() {
        let request = PageRequest::of(0, 10).unwrap();
        let first = Page::from_ordered((0..15).collect::<Vec<_>>(), &request);
        assert_eq!(first.number_of_elements(), 10);
        assert_eq!(first.total_pages(), 2);
        assert!(first.is_first());
        assert!(!first.is_last());

        let request = PageRequest::of(1, 10).unwrap();
        let second = Page::from_ordered((0..15).collect::<Vec<_>>(), &request);
        assert_eq!(second.content, vec![10, 11, 12, 13, 14]);
        assert!(second.is_last());
        assert!(second.has_previous());
    }

    #[test]
    fn test_page_beyond_last_is_empty_with_total() {
        let request = PageRequest::of(5, 10).unwrap();
        let page = Page::from_ordered((0..15).collect::<Vec<_>>(), &request);
        assert!(page.is_empty());
        assert_eq!(page.total_elements, 15);
        assert!(page.is_last());
    }

    #[test]
    fn test_largest_page_index_does_not_overflow() {
        let request = PageRequest::of(usize::MAX, 10).unwrap();
        let page = Page::from_ordered((0..15).collect::<Vec<_>>(), &request);
        assert!(page.is_empty());
        assert!(!page.has_next());
        assert!(page.is_last());
        assert!(page.has_previous());
    }

    #[test]
    fn test_unpaged_is_single_page() {
        let page = Page::from_ordered(vec![1, 2, 3], &PageRequest::Unpaged);
        assert_eq!(page.size, 3);
        assert_eq!(page.total_pages(), 1);
        assert!(page.is_first() && page.is_last());

        let empty: Page<i32> = Page::from_ordered(Vec::new(), &PageRequest::Unpaged);
        assert_eq!(empty.total_pages(), 1);
    }

    #[test]
    fn test_empty_paged_result_has_zero_pages() {
        let request = PageRequest::of(0, 10).unwrap();
        let page: Page<i32> = Page::from_ordered(Vec::new(), &request);
        assert_eq!(page.total_pages(), 0);
        assert!(page.is_first());
        assert!(page.is_last());
    }

    #[test]
    fn test_sort_field_parsing() {
        assert_eq!("phoneNumber".parse::<SortField>().unwrap(), SortField::PhoneNumber);
        assert_eq!("created_at".parse::<SortField>().unwrap(), SortField::CreatedAt);
        assert!("password".parse::<SortField>().is_err());
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!("sideways".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_cache_repr_distinguishes_requests() {
        let a = PageRequest::sorted(0, 10, Sort::asc(SortField::Name)).unwrap();
        let b = PageRequest::sorted(0, 10, Sort::desc(SortField::Name)).unwrap();
        assert_ne!(a.cache_repr(), b.cache_repr());
        assert_ne!(a.cache_repr(), PageRequest::Unpaged.cache_repr());
    }
}
