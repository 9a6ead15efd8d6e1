//! Client-side listing state: the current page, its total and the fetch
//! lifecycle, published through a `watch` channel.
//!
//! Concurrent fetches are ticketed. Only the most recently started fetch
//! may change the visible page; older results are dropped when they land.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use super::domain::{ListingForm, ServiceListing};
use super::query;
use super::repository::ListingRepository;
use super::service::ListingService;
use crate::errors::ServiceError;
use crate::filters::SearchFilters;
use crate::notify::{Notice, Notifier};
use crate::upload::{BlobStore, ImageUpload};
use common::metrics::LISTING_FETCH_SUPERSEDED_TOTAL;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingState {
    pub items: Vec<ServiceListing>,
    pub total: u64,
    pub loading: bool,
    /// Message of the last failed fetch; cleared by the next success.
    pub error: Option<String>,
    pub last_filters: SearchFilters,
    pub last_page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch started before this one resolved; nothing was applied.
    Superseded,
}

pub struct ListingStore<R: ListingRepository + ?Sized, N: Notifier + ?Sized> {
    service: ListingService<R>,
    notifier: Arc<N>,
    latest: AtomicU64,
    state: watch::Sender<ListingState>,
}

impl<R: ListingRepository + ?Sized, N: Notifier + ?Sized> ListingStore<R, N> {
    pub fn new(repo: Arc<R>, notifier: Arc<N>, timeout: Duration) -> Self {
        Self::from_service(ListingService::new(repo, timeout), notifier)
    }

    pub fn from_service(service: ListingService<R>, notifier: Arc<N>) -> Self {
        let (state, _) = watch::channel(ListingState::default());
        Self { service, notifier, latest: AtomicU64::new(0), state }
    }

    pub fn service(&self) -> &ListingService<R> {
        &self.service
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ListingState {
        self.state.borrow().clone()
    }

    fn fail(&self, title: &str, err: &ServiceError) {
        warn!(error = %err, "{title}");
        self.notifier.notify(Notice::error(title, err.to_string()));
    }

    /// Load one page. Failures notify once per call and keep the previous
    /// items; only the latest call's resolution updates the state.
    pub async fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
        filters: &SearchFilters,
    ) -> Result<FetchOutcome, ServiceError> {
        // Tickets are issued and checked under the watch lock, so write order
        // follows ticket order.
        let mut ticket = 0;
        self.state.send_modify(|s| {
            ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            s.loading = true;
            s.last_filters = filters.clone();
            s.last_page = page.max(1);
            s.page_size = page_size.max(1);
        });

        let result = self.service.run(&query::build(filters, page, page_size)).await;
        match result {
            Ok(fetched) => {
                let applied = self.state.send_if_modified(|s| {
                    if self.latest.load(Ordering::SeqCst) != ticket {
                        return false;
                    }
                    s.items = fetched.items;
                    s.total = fetched.total;
                    s.loading = false;
                    s.error = None;
                    true
                });
                if !applied {
                    debug!(ticket, "dropping superseded listing page");
                    LISTING_FETCH_SUPERSEDED_TOTAL.inc();
                    return Ok(FetchOutcome::Superseded);
                }
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                self.fail("Error loading services", &e);
                let applied = self.state.send_if_modified(|s| {
                    if self.latest.load(Ordering::SeqCst) != ticket {
                        return false;
                    }
                    s.loading = false;
                    s.error = Some(e.to_string());
                    true
                });
                if !applied {
                    LISTING_FETCH_SUPERSEDED_TOTAL.inc();
                }
                Err(e)
            }
        }
    }

    pub async fn get_listing(&self, id: Uuid) -> Result<ServiceListing, ServiceError> {
        self.service.get(id).await.inspect_err(|e| self.fail("Error loading service", e))
    }

    pub async fn owner_listings(&self, owner: Uuid) -> Result<Vec<ServiceListing>, ServiceError> {
        self.service.owner_listings(owner).await.inspect_err(|e| self.fail("Error loading services", e))
    }

    pub async fn create_listing(&self, actor: Option<Uuid>, form: &ListingForm) -> Result<ServiceListing, ServiceError> {
        self.create_listing_with_image(actor, form, None, &NoBlobs).await
    }

    pub async fn create_listing_with_image(
        &self,
        actor: Option<Uuid>,
        form: &ListingForm,
        image: Option<ImageUpload>,
        blobs: &dyn BlobStore,
    ) -> Result<ServiceListing, ServiceError> {
        let result = self.service.create_with_image(actor, form, image, blobs).await;
        self.report(&result, "Error creating service", "Service created", "Your service listing has been created successfully.");
        result
    }

    pub async fn update_listing(
        &self,
        actor: Option<Uuid>,
        listing: &ServiceListing,
        form: &ListingForm,
    ) -> Result<ServiceListing, ServiceError> {
        let result = self.service.update(actor, listing, form).await;
        self.report(&result, "Error updating service", "Service updated", "Your service listing has been updated successfully.");
        result
    }

    pub async fn delete_listing(&self, actor: Option<Uuid>, listing: &ServiceListing) -> Result<(), ServiceError> {
        let result = self.service.delete(actor, listing).await;
        self.report(&result, "Error deleting service", "Service deleted", "Your service listing has been deleted successfully.");
        result
    }

    /// Field errors are shown next to the form, so they do not notify.
    fn report<T>(&self, result: &Result<T, ServiceError>, error_title: &str, ok_title: &str, ok_message: &str) {
        match result {
            Ok(_) => self.notifier.notify(Notice::success(ok_title, ok_message)),
            Err(ServiceError::Validation(_)) => {}
            Err(e) => self.fail(error_title, e),
        }
    }
}

/// Blob store for creates without an image; never called.
struct NoBlobs;

#[async_trait::async_trait]
impl BlobStore for NoBlobs {
    async fn put(&self, _key: &str, _content_type: &str, _bytes: Vec<u8>) -> Result<String, ServiceError> {
        Err(ServiceError::Network("no blob store configured".into()))
    }
}
