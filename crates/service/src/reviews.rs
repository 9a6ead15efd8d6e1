//! Append-only reviews. The listing rating is recomputed from these on read.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::errors::AuthError;
use crate::errors::{ServiceError, ValidationErrors};
use crate::listing::domain::ServiceListing;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub service_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<models::review::Model> for Review {
    fn from(m: models::review::Model) -> Self {
        Self {
            id: m.id,
            service_id: m.service_id,
            user_id: m.user_id,
            rating: m.rating,
            comment: m.comment,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewForm {
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ReviewForm {
    /// Trimmed comment; blank counts as absent.
    pub fn comment(&self) -> Option<String> {
        self.comment.as_ref().map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = ValidationErrors::new();
        errs.check((1..=5).contains(&self.rating), "rating", "Please select a rating");
        if let Some(c) = self.comment() {
            errs.check(c.chars().count() >= 10, "comment", "Review must be at least 10 characters");
        }
        errs.into_result()
    }
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reviews of one listing, newest first.
    async fn list_reviews(&self, service_id: Uuid) -> Result<Vec<Review>, ServiceError>;
    async fn insert_review(&self, service_id: Uuid, user_id: Uuid, form: &ReviewForm) -> Result<Review, ServiceError>;
}

pub struct ReviewService<R: ReviewRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: ReviewRepository + ?Sized> ReviewService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, service_id: Uuid) -> Result<Vec<Review>, ServiceError> {
        self.repo.list_reviews(service_id).await
    }

    /// Submit a review as `actor`. Owners cannot review their own listing.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::listing::repository::mock::MockListingRepository;
    /// use service::reviews::{ReviewForm, ReviewService};
    /// # use service::listing::domain::ServiceListing;
    /// # let listing: ServiceListing = serde_json::from_value(serde_json::json!({
    /// #   "id": uuid::Uuid::new_v4(), "user_id": uuid::Uuid::new_v4(), "title": "Piano lessons",
    /// #   "description": "Beginner to advanced piano tuition", "category": "music", "city": "paris",
    /// #   "contact_email": "p@example.com", "contact_phone": null, "image_url": null,
    /// #   "created_at": "2024-03-01T10:00:00Z", "updated_at": "2024-03-01T10:00:00Z", "average_rating": null
    /// # })).unwrap();
    /// let svc = ReviewService::new(Arc::new(MockListingRepository::new()));
    /// let form = ReviewForm { rating: 5, comment: Some("Patient and well prepared".into()) };
    /// let review = tokio_test::block_on(svc.submit(Some(uuid::Uuid::new_v4()), &listing, &form)).unwrap();
    /// assert_eq!(review.rating, 5);
    /// ```
    #[instrument(skip(self, listing, form), fields(service_id = %listing.id))]
    pub async fn submit(&self, actor: Option<Uuid>, listing: &ServiceListing, form: &ReviewForm) -> Result<Review, ServiceError> {
        let actor = actor.ok_or(AuthError::Unauthorized)?;
        if listing.is_owned_by(actor) {
            return Err(ServiceError::Permission("you cannot review your own service".into()));
        }
        form.validate()?;
        let review = self.repo.insert_review(listing.id, actor, form).await?;
        info!(review_id = %review.id, rating = review.rating, "review_submitted");
        Ok(review)
    }
}
