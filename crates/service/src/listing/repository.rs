use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{ListingForm, ListingPage, ServiceListing};
use super::query::QueryDescription;
use crate::errors::ServiceError;

/// Persistence seam for listings. Ratings on returned listings are
/// derived from the stored reviews at read time.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Rows inside the description's range plus the exact total.
    async fn find_page(&self, query: &QueryDescription) -> Result<ListingPage, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceListing>, ServiceError>;
    async fn insert(&self, owner: Uuid, form: &ListingForm) -> Result<ServiceListing, ServiceError>;
    /// Only rows owned by `owner` are touched; otherwise `NotFound`.
    async fn update_owned(&self, id: Uuid, owner: Uuid, form: &ListingForm) -> Result<ServiceListing, ServiceError>;
    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> Result<(), ServiceError>;
}

/// In-memory marketplace backend for tests, doc examples and local demos.
/// Implements the listing, review and request repositories over shared state.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::Utc;

    use crate::rating;
    use crate::requests::{RequestForm, RequestRepository, ServiceRequest};
    use crate::reviews::{Review, ReviewForm, ReviewRepository};

    /// Behaviour of one scripted `find_page` call.
    #[derive(Debug, Clone, Default)]
    struct Script {
        delay: Duration,
        fail: Option<String>,
    }

    #[derive(Default)]
    pub struct MockListingRepository {
        listings: Mutex<Vec<ServiceListing>>,
        reviews: Mutex<Vec<Review>>,
        requests: Mutex<Vec<ServiceRequest>>,
        scripts: Mutex<VecDeque<Script>>,
        failing: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockListingRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Store a listing as-is (ids and timestamps are kept).
        pub fn seed(&self, listing: ServiceListing) {
            self.listings.lock().unwrap().push(listing);
        }

        pub fn seed_review(&self, service_id: Uuid, user_id: Uuid, rating: i32) {
            self.reviews.lock().unwrap().push(Review {
                id: Uuid::new_v4(),
                service_id,
                user_id,
                rating,
                comment: None,
                created_at: Utc::now(),
            });
        }

        /// Delay the next `find_page` call.
        pub fn push_delay(&self, delay: Duration) {
            self.scripts.lock().unwrap().push_back(Script { delay, fail: None });
        }

        /// Make the next `find_page` call fail after `delay`.
        pub fn push_failure(&self, message: &str, delay: Duration) {
            self.scripts.lock().unwrap().push_back(Script { delay, fail: Some(message.to_string()) });
        }

        /// Fail every backend call until reset.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Number of backend calls of any kind.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<ServiceRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn enter(&self) -> Result<(), ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(ServiceError::Network("backend unavailable".into()));
            }
            Ok(())
        }

        fn with_rating(&self, mut listing: ServiceListing) -> ServiceListing {
            let scores: Vec<i32> = self
                .reviews
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.service_id == listing.id)
                .map(|r| r.rating)
                .collect();
            listing.average_rating = rating::aggregate(&scores);
            listing
        }

        fn build(&self, id: Uuid, owner: Uuid, form: &ListingForm) -> ServiceListing {
            let f = form.fields();
            let now = Utc::now();
            ServiceListing {
                id,
                user_id: owner,
                title: f.title,
                description: f.description,
                category: f.category,
                city: f.city,
                contact_email: f.contact_email,
                contact_phone: f.contact_phone,
                image_url: f.image_url,
                created_at: now,
                updated_at: now,
                average_rating: None,
            }
        }
    }

    #[async_trait]
    impl ListingRepository for MockListingRepository {
        async fn find_page(&self, query: &QueryDescription) -> Result<ListingPage, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
            if !script.delay.is_zero() {
                tokio::time::sleep(script.delay).await;
            }
            if let Some(msg) = script.fail {
                return Err(ServiceError::Network(msg));
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(ServiceError::Network("backend unavailable".into()));
            }

            let mut matched: Vec<ServiceListing> =
                self.listings.lock().unwrap().iter().filter(|l| query.matches(l)).cloned().collect();
            matched.sort_by(|a, b| query.compare(a, b));
            let total = matched.len() as u64;
            let window: Vec<ServiceListing> = match &query.range {
                Some(r) => matched.into_iter().skip(r.start as usize).take((r.end - r.start) as usize).collect(),
                None => matched,
            };
            let items = window.into_iter().map(|l| self.with_rating(l)).collect();
            Ok(ListingPage { items, total })
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceListing>, ServiceError> {
            self.enter()?;
            let found = self.listings.lock().unwrap().iter().find(|l| l.id == id).cloned();
            Ok(found.map(|l| self.with_rating(l)))
        }

        async fn insert(&self, owner: Uuid, form: &ListingForm) -> Result<ServiceListing, ServiceError> {
            self.enter()?;
            let listing = self.build(Uuid::new_v4(), owner, form);
            self.listings.lock().unwrap().push(listing.clone());
            Ok(listing)
        }

        async fn update_owned(&self, id: Uuid, owner: Uuid, form: &ListingForm) -> Result<ServiceListing, ServiceError> {
            self.enter()?;
            let updated = {
                let mut listings = self.listings.lock().unwrap();
                let slot = listings
                    .iter_mut()
                    .find(|l| l.id == id && l.user_id == owner)
                    .ok_or_else(|| ServiceError::not_found("service"))?;
                let mut next = self.build(id, owner, form);
                next.created_at = slot.created_at;
                *slot = next.clone();
                next
            };
            Ok(self.with_rating(updated))
        }

        async fn delete_owned(&self, id: Uuid, owner: Uuid) -> Result<(), ServiceError> {
            self.enter()?;
            let mut listings = self.listings.lock().unwrap();
            let before = listings.len();
            listings.retain(|l| !(l.id == id && l.user_id == owner));
            if listings.len() == before {
                return Err(ServiceError::not_found("service"));
            }
            drop(listings);
            self.reviews.lock().unwrap().retain(|r| r.service_id != id);
            self.requests.lock().unwrap().retain(|r| r.service_id != id);
            Ok(())
        }
    }

    #[async_trait]
    impl ReviewRepository for MockListingRepository {
        async fn list_reviews(&self, service_id: Uuid) -> Result<Vec<Review>, ServiceError> {
            self.enter()?;
            let mut out: Vec<Review> =
                self.reviews.lock().unwrap().iter().filter(|r| r.service_id == service_id).cloned().collect();
            out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(out)
        }

        async fn insert_review(&self, service_id: Uuid, user_id: Uuid, form: &ReviewForm) -> Result<Review, ServiceError> {
            self.enter()?;
            let review = Review {
                id: Uuid::new_v4(),
                service_id,
                user_id,
                rating: form.rating,
                comment: form.comment(),
                created_at: Utc::now(),
            };
            self.reviews.lock().unwrap().push(review.clone());
            Ok(review)
        }
    }

    #[async_trait]
    impl RequestRepository for MockListingRepository {
        async fn insert_request(&self, service_id: Uuid, form: &RequestForm) -> Result<ServiceRequest, ServiceError> {
            self.enter()?;
            let request = ServiceRequest {
                id: Uuid::new_v4(),
                service_id,
                name: form.name.trim().to_string(),
                email: form.email.trim().to_string(),
                phone: form.phone(),
                message: form.message.trim().to_string(),
                created_at: Utc::now(),
            };
            self.requests.lock().unwrap().push(request.clone());
            Ok(request)
        }
    }
}
