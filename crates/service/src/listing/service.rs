use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{ListingForm, ListingPage, ServiceListing};
use super::query::{self, QueryDescription};
use super::repository::ListingRepository;
use crate::auth::errors::AuthError;
use crate::errors::ServiceError;
use crate::filters::SearchFilters;
use crate::upload::{self, BlobStore, ImageUpload};
use common::metrics::{LISTING_FETCH_DURATION, LISTING_FETCH_FAILURES_TOTAL, LISTING_FETCH_TOTAL};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Stateless listing operations: every backend call is bounded by `timeout`
/// and owner-only mutations are checked before the backend is touched.
pub struct ListingService<R: ListingRepository + ?Sized> {
    repo: Arc<R>,
    timeout: Duration,
}

/// Signed-in owner of `listing`, or the reason the actor may not mutate it.
pub fn ensure_owner(actor: Option<Uuid>, listing: &ServiceListing) -> Result<Uuid, ServiceError> {
    let actor = actor.ok_or(AuthError::Unauthorized)?;
    if !listing.is_owned_by(actor) {
        return Err(ServiceError::Permission("only the owner can change this service".into()));
    }
    Ok(actor)
}

impl<R: ListingRepository + ?Sized> ListingService<R> {
    pub fn new(repo: Arc<R>, timeout: Duration) -> Self {
        Self { repo, timeout }
    }

    pub fn repo(&self) -> &Arc<R> {
        &self.repo
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T, ServiceError>>) -> Result<T, ServiceError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(self.timeout)),
        }
    }

    /// Run one query description against the repository.
    pub async fn run(&self, query: &QueryDescription) -> Result<ListingPage, ServiceError> {
        LISTING_FETCH_TOTAL.inc();
        let timer = LISTING_FETCH_DURATION.start_timer();
        let result = self.bounded(self.repo.find_page(query)).await;
        timer.observe_duration();
        if result.is_err() {
            LISTING_FETCH_FAILURES_TOTAL.inc();
        }
        result
    }

    /// Filters + page -> matching listings and exact total.
    ///
    /// # Examples
    /// ```
    /// use std::{sync::Arc, time::Duration};
    /// use service::filters::decode;
    /// use service::listing::{repository::mock::MockListingRepository, service::ListingService};
    /// let svc = ListingService::new(Arc::new(MockListingRepository::new()), Duration::from_secs(15));
    /// let page = tokio_test::block_on(svc.search(&decode("category=design"), 1, 9)).unwrap();
    /// assert_eq!(page.total, 0);
    /// assert!(page.items.is_empty());
    /// ```
    #[instrument(skip(self, filters))]
    pub async fn search(&self, filters: &SearchFilters, page: u32, page_size: u32) -> Result<ListingPage, ServiceError> {
        self.run(&query::build(filters, page, page_size)).await
    }

    pub async fn get(&self, id: Uuid) -> Result<ServiceListing, ServiceError> {
        self.bounded(self.repo.find_by_id(id))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("service {id}")))
    }

    pub async fn owner_listings(&self, owner: Uuid) -> Result<Vec<ServiceListing>, ServiceError> {
        Ok(self.run(&QueryDescription::for_owner(owner)).await?.items)
    }

    #[instrument(skip(self, form), fields(title = %form.title))]
    pub async fn create(&self, actor: Option<Uuid>, form: &ListingForm) -> Result<ServiceListing, ServiceError> {
        let owner = actor.ok_or(AuthError::Unauthorized)?;
        form.validate()?;
        let created = self.bounded(self.repo.insert(owner, form)).await?;
        info!(service_id = %created.id, owner = %owner, "service_created");
        Ok(created)
    }

    /// Create the listing, then attach an uploaded image. An upload failure
    /// leaves the listing in place without an image.
    pub async fn create_with_image(
        &self,
        actor: Option<Uuid>,
        form: &ListingForm,
        image: Option<ImageUpload>,
        blobs: &dyn BlobStore,
    ) -> Result<ServiceListing, ServiceError> {
        let created = self.create(actor, form).await?;
        let Some(image) = image else { return Ok(created) };
        let url = match upload::upload_image(blobs, image).await {
            Ok(url) => url,
            Err(e) => {
                warn!(service_id = %created.id, error = %e, "image upload failed; keeping service without image");
                return Ok(created);
            }
        };
        let mut with_image = ListingForm::from(&created);
        with_image.image_url = Some(url);
        match self.bounded(self.repo.update_owned(created.id, created.user_id, &with_image)).await {
            Ok(updated) => Ok(updated),
            Err(e) => {
                warn!(service_id = %created.id, error = %e, "attaching image failed");
                Ok(created)
            }
        }
    }

    #[instrument(skip(self, listing, form), fields(service_id = %listing.id))]
    pub async fn update(
        &self,
        actor: Option<Uuid>,
        listing: &ServiceListing,
        form: &ListingForm,
    ) -> Result<ServiceListing, ServiceError> {
        let owner = ensure_owner(actor, listing)?;
        form.validate()?;
        let updated = self.bounded(self.repo.update_owned(listing.id, owner, form)).await?;
        info!(service_id = %updated.id, "service_updated");
        Ok(updated)
    }

    #[instrument(skip(self, listing), fields(service_id = %listing.id))]
    pub async fn delete(&self, actor: Option<Uuid>, listing: &ServiceListing) -> Result<(), ServiceError> {
        let owner = ensure_owner(actor, listing)?;
        self.bounded(self.repo.delete_owned(listing.id, owner)).await?;
        info!(service_id = %listing.id, "service_deleted");
        Ok(())
    }
}
