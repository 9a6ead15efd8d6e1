//! URL query string <-> [`SearchFilters`].
//!
//! Only `query`, `category` and `city` are recognized. The `"_all"`
//! sentinel and empty values mean "no filter" and are never encoded.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Sentinel used by select inputs for "any".
pub const ALL: &str = "_all";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl SearchFilters {
    pub fn new(query: Option<String>, category: Option<String>, city: Option<String>) -> Self {
        Self { query: normalize_text(query), category: normalize_choice(category), city: normalize_choice(city) }
    }

    pub fn is_filtered(&self) -> bool {
        self.query.is_some() || self.category.is_some() || self.city.is_some()
    }

    /// Pin the category taken from a `/category/:category` path.
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = normalize_choice(Some(category.to_string()));
        self
    }
}

pub(crate) fn normalize_choice(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != ALL)
}

pub(crate) fn normalize_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parse a query string. A leading `?` is accepted; the first occurrence
/// of a repeated key wins and unknown keys are ignored.
pub fn decode(query_string: &str) -> SearchFilters {
    let raw = query_string.strip_prefix('?').unwrap_or(query_string);
    let (mut query, mut category, mut city) = (None, None, None);
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        let slot = match key.as_ref() {
            "query" => &mut query,
            "category" => &mut category,
            "city" => &mut city,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }
    SearchFilters::new(query, category, city)
}

/// Render filters back into a query string (no leading `?`).
pub fn encode(filters: &SearchFilters) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    if let Some(q) = normalize_text(filters.query.clone()) {
        out.append_pair("query", &q);
    }
    if let Some(c) = normalize_choice(filters.category.clone()) {
        out.append_pair("category", &c);
    }
    if let Some(c) = normalize_choice(filters.city.clone()) {
        out.append_pair("city", &c);
    }
    out.finish()
}
