//! Fixed category and city lists. Stored values are the lowercase slugs.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub value: &'static str,
    pub label: &'static str,
}

const fn entry(value: &'static str, label: &'static str) -> CatalogEntry {
    CatalogEntry { value, label }
}

pub const CATEGORIES: &[CatalogEntry] = &[
    entry("business", "Business"),
    entry("design", "Design"),
    entry("development", "Development"),
    entry("marketing", "Marketing"),
    entry("writing", "Writing"),
    entry("education", "Education"),
    entry("music", "Music"),
    entry("video", "Video"),
    entry("photography", "Photography"),
    entry("other", "Other"),
];

pub const CITIES: &[CatalogEntry] = &[
    entry("new-york", "New York"),
    entry("london", "London"),
    entry("paris", "Paris"),
    entry("tokyo", "Tokyo"),
    entry("berlin", "Berlin"),
    entry("sydney", "Sydney"),
    entry("toronto", "Toronto"),
    entry("singapore", "Singapore"),
    entry("dubai", "Dubai"),
    entry("other", "Other"),
];

pub fn is_category(value: &str) -> bool {
    CATEGORIES.iter().any(|c| c.value == value)
}

pub fn is_city(value: &str) -> bool {
    CITIES.iter().any(|c| c.value == value)
}

pub fn category_label(value: &str) -> Option<&'static str> {
    CATEGORIES.iter().find(|c| c.value == value).map(|c| c.label)
}

pub fn city_label(value: &str) -> Option<&'static str> {
    CITIES.iter().find(|c| c.value == value).map(|c| c.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        assert!(is_category("design"));
        assert!(!is_category("Design"));
        assert!(is_city("new-york"));
        assert_eq!(city_label("new-york"), Some("New York"));
        assert_eq!(category_label("cooking"), None);
    }

    #[test]
    fn both_lists_end_with_other() {
        assert_eq!(CATEGORIES.last().map(|c| c.value), Some("other"));
        assert_eq!(CITIES.last().map(|c| c.value), Some("other"));
        assert_eq!(CATEGORIES.len(), 10);
        assert_eq!(CITIES.len(), 10);
    }
}
