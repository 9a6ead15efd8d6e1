//! Filters + page cursor -> backend-neutral query description.
//!
//! Every backend consumes the same [`QueryDescription`]: the SeaORM
//! repository turns it into SQL, the remote repository into API query
//! parameters, and the in-memory repository evaluates [`QueryDescription::matches`].

use std::ops::Range;

use serde::Serialize;
use uuid::Uuid;

use super::domain::ServiceListing;
use crate::filters::{normalize_choice, normalize_text, SearchFilters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

/// Newest first; `id` breaks ties so paging is stable.
pub const DEFAULT_SORT: [SortKey; 2] = [
    SortKey { field: SortField::CreatedAt, descending: true },
    SortKey { field: SortField::Id, descending: true },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Return the exact match count alongside the rows.
    Exact,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDescription {
    /// Case-insensitive substring matched against title OR description.
    pub text: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub owner: Option<Uuid>,
    pub sort: [SortKey; 2],
    /// Row window `[offset, offset + page_size)`; `None` returns every match.
    pub range: Option<Range<u64>>,
    pub count: CountMode,
}

/// Build the description for one page of results. Page 0 is read as page 1
/// and a zero page size as 1.
///
/// # Examples
/// ```
/// use service::filters::decode;
/// use service::listing::query::build;
/// let q = build(&decode("query=logo&category=_all"), 2, 9);
/// assert_eq!(q.text.as_deref(), Some("logo"));
/// assert_eq!(q.category, None);
/// assert_eq!(q.range, Some(9..18));
/// ```
pub fn build(filters: &SearchFilters, page: u32, page_size: u32) -> QueryDescription {
    let page = u64::from(page.max(1));
    let size = u64::from(page_size.max(1));
    let offset = (page - 1) * size;
    QueryDescription {
        text: normalize_text(filters.query.clone()),
        category: normalize_choice(filters.category.clone()),
        city: normalize_choice(filters.city.clone()),
        owner: None,
        sort: DEFAULT_SORT,
        range: Some(offset..offset + size),
        count: CountMode::Exact,
    }
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl QueryDescription {
    /// Every listing of one owner, newest first (dashboard).
    pub fn for_owner(owner: Uuid) -> Self {
        Self {
            text: None,
            category: None,
            city: None,
            owner: Some(owner),
            sort: DEFAULT_SORT,
            range: None,
            count: CountMode::None,
        }
    }

    /// Lower-cased `%text%` pattern with wildcards in the user text escaped.
    pub fn like_pattern(&self) -> Option<String> {
        self.text.as_ref().map(|t| format!("%{}%", escape_like(&t.to_lowercase())))
    }

    pub fn page_size(&self) -> Option<u64> {
        self.range.as_ref().map(|r| r.end - r.start)
    }

    /// 1-based page number implied by the range.
    pub fn page(&self) -> Option<u64> {
        let r = self.range.as_ref()?;
        let size = (r.end - r.start).max(1);
        Some(r.start / size + 1)
    }

    /// Evaluate the predicates against one listing.
    pub fn matches(&self, listing: &ServiceListing) -> bool {
        if let Some(owner) = self.owner {
            if listing.user_id != owner {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &listing.category != category {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if &listing.city != city {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            if !listing.title.to_lowercase().contains(&needle)
                && !listing.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }

    /// Order two listings by the description's sort keys.
    pub fn compare(&self, a: &ServiceListing, b: &ServiceListing) -> std::cmp::Ordering {
        for key in &self.sort {
            let ord = match key.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Id => a.id.cmp(&b.id),
            };
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord.is_ne() {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    }

    /// Query parameters for `GET /api/services`.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(t) = &self.text {
            pairs.push(("query", t.clone()));
        }
        if let Some(c) = &self.category {
            pairs.push(("category", c.clone()));
        }
        if let Some(c) = &self.city {
            pairs.push(("city", c.clone()));
        }
        if let (Some(page), Some(size)) = (self.page(), self.page_size()) {
            pairs.push(("page", page.to_string()));
            pairs.push(("page_size", size.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::decode;
    use crate::test_support::listing;

    #[test]
    fn empty_filters_give_first_page_without_predicates() {
        let q = build(&SearchFilters::default(), 1, 9);
        assert_eq!(q.text, None);
        assert_eq!(q.category, None);
        assert_eq!(q.city, None);
        assert_eq!(q.range, Some(0..9));
        assert_eq!(q.count, CountMode::Exact);
        assert_eq!(q.sort, DEFAULT_SORT);
    }

    #[test]
    fn category_only_second_page() {
        let filters = SearchFilters {
            query: Some(String::new()),
            category: Some("design".into()),
            city: Some("_all".into()),
        };
        let q = build(&filters, 2, 9);
        assert_eq!(q.text, None);
        assert_eq!(q.category.as_deref(), Some("design"));
        assert_eq!(q.city, None);
        assert_eq!(q.range, Some(9..18));
        assert_eq!(q.count, CountMode::Exact);
    }

    #[test]
    fn page_zero_is_page_one() {
        assert_eq!(build(&SearchFilters::default(), 0, 9).range, Some(0..9));
        assert_eq!(build(&SearchFilters::default(), 3, 0).range, Some(2..3));
    }

    #[test]
    fn raw_sentinel_is_dropped_by_builder() {
        let raw = SearchFilters { query: Some(String::new()), category: Some("_all".into()), city: Some("_all".into()) };
        let q = build(&raw, 1, 9);
        assert_eq!((q.text, q.category, q.city), (None, None, None));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        let q = build(&decode("query=100%25_Off%5C"), 1, 9);
        assert_eq!(q.like_pattern().as_deref(), Some("%100\\%\\_off\\\\%"));
    }

    #[test]
    fn matches_text_in_title_or_description_case_insensitively() {
        let q = build(&decode("query=LOGO"), 1, 9);
        let mut l = listing("Brand logos", "design", "paris");
        assert!(q.matches(&l));
        l.title = "Branding".into();
        l.description = "I draw a Logo for you in two days".into();
        assert!(q.matches(&l));
        l.description = "Posters only".into();
        assert!(!q.matches(&l));
    }

    #[test]
    fn wildcard_characters_match_literally_in_memory() {
        let q = build(&decode("query=50%25"), 1, 9);
        assert!(q.matches(&listing("Save 50% on edits", "video", "dubai")));
        assert!(!q.matches(&listing("Save 500 on edits", "video", "dubai")));
    }

    #[test]
    fn category_and_city_are_equality_predicates() {
        let q = build(&decode("category=music&city=london"), 1, 9);
        assert!(q.matches(&listing("Guitar lessons", "music", "london")));
        assert!(!q.matches(&listing("Guitar lessons", "music", "paris")));
        assert!(!q.matches(&listing("Guitar lessons", "education", "london")));
    }

    #[test]
    fn sort_is_newest_first_then_id() {
        let q = build(&SearchFilters::default(), 1, 9);
        let mut a = listing("A listing", "other", "other");
        let mut b = listing("B listing", "other", "other");
        b.created_at = a.created_at + chrono::Duration::seconds(1);
        assert!(q.compare(&b, &a).is_lt());
        b.created_at = a.created_at;
        a.id = Uuid::from_u128(1);
        b.id = Uuid::from_u128(2);
        assert!(q.compare(&b, &a).is_lt());
    }

    #[test]
    fn query_pairs_round_trip_page_window() {
        let q = build(&decode("city=tokyo"), 3, 6);
        assert_eq!(
            q.to_query_pairs(),
            vec![("city", "tokyo".to_string()), ("page", "3".to_string()), ("page_size", "6".to_string())]
        );
    }

    #[test]
    fn owner_description_has_no_window() {
        let owner = Uuid::new_v4();
        let q = QueryDescription::for_owner(owner);
        assert_eq!(q.range, None);
        assert_eq!(q.count, CountMode::None);
        let mut l = listing("Mine here", "other", "other");
        assert!(!q.matches(&l));
        l.user_id = owner;
        assert!(q.matches(&l));
    }
}
