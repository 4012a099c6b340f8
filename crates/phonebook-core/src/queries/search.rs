use std::cmp::Ordering;

use crate::model::Contact;

/// Relevance tier of a search hit; lower tiers sort first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SearchTier {
    /// Name starts with the keyword (case-insensitive)
    NamePrefix = 1,
    /// Phone number starts with the keyword
    PhonePrefix = 2,
    /// Keyword appears somewhere else
    Other = 3,
}

impl SearchTier {
    /// Classify a contact already known to match `keyword`
    pub fn of(contact: &Contact, keyword: &str) -> Self {
        if fold(&contact.name).starts_with(&fold(keyword)) {
            SearchTier::NamePrefix
        } else if contact.phone_number.starts_with(keyword) {
            SearchTier::PhonePrefix
        } else {
            SearchTier::Other
        }
    }
}

/// Trim a search keyword, returning `None` when it means "match everything"
pub fn normalize_keyword(keyword: &str) -> Option<&str> {
    let trimmed = keyword.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Whether `contact` matches a (non-blank, trimmed) keyword
///
/// Name and email are matched case-insensitively, phone number exactly.
pub fn matches_keyword(contact: &Contact, keyword: &str) -> bool {
    let needle = fold(keyword);
    fold(&contact.name).contains(&needle)
        || contact.phone_number.contains(keyword)
        || contact
            .email
            .as_deref()
            .is_some_and(|e| fold(e).contains(&needle))
}

/// Order two matching contacts: tier, then name, then id
pub fn compare_by_relevance(a: &Contact, b: &Contact, keyword: &str) -> Ordering {
    SearchTier::of(a, keyword)
        .cmp(&SearchTier::of(b, keyword))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Case folding used by every case-insensitive comparison
pub fn fold(value: &str) -> String {
    value.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{now_millis, ContactInput};

    fn contact(id: i64, name: &str, phone: &str, email: Option<&str>) -> Contact {
        let mut input = ContactInput::new(name, phone);
        input.email = email.map(str::to_string);
        Contact::from_input(id, input, now_millis())
    }

    #[test]
    fn test_blank_keyword_means_everything() {
        assert_eq!(normalize_keyword("   "), None);
        assert_eq!(normalize_keyword(" 张 "), Some("张"));
    }

    #[test]
    fn test_match_rules() {
        let c = contact(1, "Alice Wong", "13800138001", Some("Alice@Example.com"));
        assert!(matches_keyword(&c, "alice"));
        assert!(matches_keyword(&c, "WONG"));
        assert!(matches_keyword(&c, "138001"));
        assert!(matches_keyword(&c, "example.COM"));
        assert!(!matches_keyword(&c, "bob"));
    }

    #[test]
    fn test_tiers() {
        let name_hit = contact(1, "Anna", "555", None);
        let phone_hit = contact(2, "Zed", "139", None);
        let other_hit = contact(3, "Hanna", "777", None);

        assert_eq!(SearchTier::of(&name_hit, "an"), SearchTier::NamePrefix);
        assert_eq!(SearchTier::of(&phone_hit, "13"), SearchTier::PhonePrefix);
        assert_eq!(SearchTier::of(&other_hit, "an"), SearchTier::Other);
    }

    #[test]
    fn test_relevance_ordering() {
        let mut hits = vec![
            contact(1, "Zoe", "10001", Some("x@ab.com")),
            contact(2, "Bob", "ab123", None),
            contact(3, "Abby", "20002", None),
            contact(4, "Abe", "30003", None),
        ];
        hits.sort_by(|a, b| compare_by_relevance(a, b, "ab"));
        let names: Vec<_> = hits.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Abby", "Abe", "Bob", "Zoe"]);
    }
}
