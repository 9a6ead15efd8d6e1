//! Pagination utilities for the service layer.
//!
//! `Pagination` normalizes raw API input; `Paginator` is the page control
//! state kept next to a result list.

use serde::{Deserialize, Serialize};

/// Largest page size the API hands out.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page cursor as requested over the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Missing values fall back to page 1 and `default_per_page`.
    pub fn from_params(page: Option<u32>, per_page: Option<u32>, default_per_page: u32) -> Self {
        Self { page: page.unwrap_or(1), per_page: per_page.unwrap_or(default_per_page) }.normalize()
    }

    /// Page at least 1, page size within `1..=MAX_PAGE_SIZE`.
    pub fn normalize(self) -> Self {
        Self { page: self.page.max(1), per_page: self.per_page.clamp(1, MAX_PAGE_SIZE) }
    }
}

/// `ceil(total / page_size)`; zero when there is nothing to show.
pub fn page_count(total: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    total.div_ceil(size).min(u64::from(u32::MAX)) as u32
}

/// What a result list should render below its items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageView {
    /// No results: show an empty state instead of a page control.
    Empty,
    Page { current: u32, page_count: u32, show_controls: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paginator {
    current: u32,
    page_size: u32,
    total: u64,
}

impl Paginator {
    pub fn new(page_size: u32) -> Self {
        Self { current: 1, page_size: page_size.max(1), total: 0 }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page_count(&self) -> u32 {
        page_count(self.total, self.page_size)
    }

    /// Jump to `page`, silently clamped into `[1, page_count]`.
    pub fn go_to(&mut self, page: u32) -> u32 {
        let count = self.page_count();
        self.current = if count == 0 { 1 } else { page.clamp(1, count) };
        self.current
    }

    pub fn next(&mut self) -> u32 {
        self.go_to(self.current.saturating_add(1))
    }

    pub fn prev(&mut self) -> u32 {
        self.go_to(self.current.saturating_sub(1))
    }

    pub fn has_next(&self) -> bool {
        self.current < self.page_count()
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    /// Record a new total and re-clamp the current page.
    pub fn set_total(&mut self, total: u64) {
        self.total = total;
        self.go_to(self.current);
    }

    pub fn on_filters_changed(&mut self) {
        self.reset();
    }

    pub fn show_controls(&self) -> bool {
        self.page_count() > 1
    }

    pub fn view(&self) -> PageView {
        match self.page_count() {
            0 => PageView::Empty,
            count => PageView::Page { current: self.current, page_count: count, show_controls: count > 1 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let p = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(p, Pagination { page: 1, per_page: 1 });
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let p = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(p, Pagination { page: 5, per_page: MAX_PAGE_SIZE });
    }

    #[test]
    fn missing_params_use_configured_size() {
        assert_eq!(Pagination::from_params(None, None, 9), Pagination { page: 1, per_page: 9 });
        assert_eq!(Pagination::from_params(Some(0), Some(500), 9), Pagination { page: 1, per_page: 100 });
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 9), 0);
        assert_eq!(page_count(1, 9), 1);
        assert_eq!(page_count(9, 9), 1);
        assert_eq!(page_count(10, 9), 2);
        assert_eq!(page_count(25, 0), 25);
    }

    #[test]
    fn go_to_clamps_silently() {
        let mut p = Paginator::new(9);
        p.set_total(25);
        assert_eq!(p.go_to(7), 3);
        assert_eq!(p.go_to(0), 1);
        assert_eq!(p.next(), 2);
        assert_eq!(p.next(), 3);
        assert_eq!(p.next(), 3);
        assert!(!p.has_next());
        assert!(p.has_prev());
    }

    #[test]
    fn go_to_past_last_page_lands_on_last() {
        let mut p = Paginator::new(9);
        p.set_total(18);
        assert_eq!(p.page_count(), 2);
        assert_eq!(p.go_to(5), 2);
    }

    #[test]
    fn prev_stops_at_first_page() {
        let mut p = Paginator::new(9);
        p.set_total(20);
        assert_eq!(p.prev(), 1);
        assert!(!p.has_prev());
    }

    #[test]
    fn shrinking_total_reclamps_current() {
        let mut p = Paginator::new(5);
        p.set_total(50);
        p.go_to(10);
        p.set_total(12);
        assert_eq!(p.current(), 3);
    }

    #[test]
    fn filter_change_returns_to_first_page() {
        let mut p = Paginator::new(9);
        p.set_total(100);
        p.go_to(4);
        p.on_filters_changed();
        assert_eq!(p.current(), 1);
    }

    #[test]
    fn empty_total_renders_empty_state() {
        let mut p = Paginator::new(9);
        p.set_total(0);
        assert_eq!(p.view(), PageView::Empty);
        assert!(!p.show_controls());
        assert_eq!(p.go_to(3), 1);
    }

    #[test]
    fn single_page_hides_controls() {
        let mut p = Paginator::new(9);
        p.set_total(4);
        assert_eq!(p.view(), PageView::Page { current: 1, page_count: 1, show_controls: false });
        p.set_total(10);
        assert!(p.show_controls());
    }
}
