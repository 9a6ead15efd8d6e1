//! What a viewer may do on a listing's detail page.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::ServiceListing;
use crate::rating::format_rating;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailControls {
    pub can_edit: bool,
    pub can_delete: bool,
    pub show_request_form: bool,
    pub show_review_form: bool,
}

impl DetailControls {
    /// Owners manage their listing; signed-in visitors may request and
    /// review; anonymous visitors may only send a request.
    pub fn for_viewer(viewer: Option<Uuid>, listing: &ServiceListing) -> Self {
        match viewer {
            Some(id) if listing.is_owned_by(id) => Self { can_edit: true, can_delete: true, ..Self::default() },
            Some(_) => Self { show_request_form: true, show_review_form: true, ..Self::default() },
            None => Self { show_request_form: true, ..Self::default() },
        }
    }
}

/// Detail payload shared by the HTTP API and its clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
    pub listing: ServiceListing,
    pub rating_label: String,
    pub category_label: String,
    pub city_label: String,
    pub controls: DetailControls,
}

impl ListingDetail {
    pub fn new(listing: ServiceListing, viewer: Option<Uuid>) -> Self {
        Self {
            rating_label: format_rating(listing.average_rating),
            category_label: listing.category_label().to_string(),
            city_label: listing.city_label().to_string(),
            controls: DetailControls::for_viewer(viewer, &listing),
            listing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::listing;

    #[test]
    fn owner_gets_edit_and_delete_only() {
        let l = listing("Yoga classes", "education", "dubai");
        let c = DetailControls::for_viewer(Some(l.user_id), &l);
        assert_eq!(c, DetailControls { can_edit: true, can_delete: true, show_request_form: false, show_review_form: false });
    }

    #[test]
    fn signed_in_visitor_can_request_and_review() {
        let l = listing("Yoga classes", "education", "dubai");
        let c = DetailControls::for_viewer(Some(Uuid::new_v4()), &l);
        assert!(!c.can_edit && !c.can_delete);
        assert!(c.show_request_form && c.show_review_form);
    }

    #[test]
    fn anonymous_visitor_can_only_request() {
        let l = listing("Yoga classes", "education", "dubai");
        let c = DetailControls::for_viewer(None, &l);
        assert_eq!(c, DetailControls { show_request_form: true, ..DetailControls::default() });
    }

    #[test]
    fn detail_labels() {
        let mut l = listing("Yoga classes", "education", "new-york");
        l.average_rating = Some(4.5);
        let d = ListingDetail::new(l, None);
        assert_eq!(d.rating_label, "4.5");
        assert_eq!(d.category_label, "Education");
        assert_eq!(d.city_label, "New York");
    }
}
