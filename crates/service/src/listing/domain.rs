use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{is_email, ServiceError, ValidationErrors};
use models::catalog;

/// A listing as shown to readers, with its derived rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceListing {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub city: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Absent when the listing has no reviews.
    pub average_rating: Option<f64>,
}

impl ServiceListing {
    pub fn from_model(m: models::service::Model, average_rating: Option<f64>) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            title: m.title,
            description: m.description,
            category: m.category,
            city: m.city,
            contact_email: m.contact_email,
            contact_phone: m.contact_phone,
            image_url: m.image_url,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
            average_rating,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn category_label(&self) -> &str {
        catalog::category_label(&self.category).unwrap_or(&self.category)
    }

    pub fn city_label(&self) -> &str {
        catalog::city_label(&self.city).unwrap_or(&self.city)
    }
}

/// One page of listings plus the exact number of matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    pub items: Vec<ServiceListing>,
    pub total: u64,
}

/// Create/edit form for a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub city: String,
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ListingForm {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = ValidationErrors::new();
        let title_len = self.title.trim().chars().count();
        errs.check(title_len >= 5, "title", "Title must be at least 5 characters");
        errs.check(title_len <= 100, "title", "Title must be at most 100 characters");
        errs.check(
            self.description.trim().chars().count() >= 20,
            "description",
            "Description must be at least 20 characters",
        );
        errs.check(catalog::is_category(&self.category), "category", "Please select a category");
        errs.check(catalog::is_city(&self.city), "city", "Please select a city");
        errs.check(is_email(&self.contact_email), "contact_email", "Please enter a valid email");
        errs.into_result()
    }

    pub fn fields(&self) -> models::service::Fields {
        let optional = |v: &Option<String>| v.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        models::service::Fields {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.clone(),
            city: self.city.clone(),
            contact_email: self.contact_email.trim().to_string(),
            contact_phone: optional(&self.contact_phone),
            image_url: optional(&self.image_url),
        }
    }
}

impl From<&ServiceListing> for ListingForm {
    fn from(l: &ServiceListing) -> Self {
        Self {
            title: l.title.clone(),
            description: l.description.clone(),
            category: l.category.clone(),
            city: l.city.clone(),
            contact_email: l.contact_email.clone(),
            contact_phone: l.contact_phone.clone(),
            image_url: l.image_url.clone(),
        }
    }
}
