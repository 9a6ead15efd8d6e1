use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::repository::AuthRepository;
use service::auth::service::{AuthService, AuthSettings};
use service::listing::repo::seaorm::SeaOrmListingRepository;
use service::listing::repository::ListingRepository;
use service::listing::ListingService;
use service::requests::{RequestRepository, RequestService};
use service::reviews::{ReviewRepository, ReviewService};
use service::upload::{self, BlobStore};

/// Shared handler state, built once at startup.
#[derive(Clone)]
pub struct ServerState {
    pub listings: Arc<ListingService<dyn ListingRepository>>,
    pub reviews: Arc<ReviewService<dyn ReviewRepository>>,
    pub requests: Arc<RequestService<dyn RequestRepository>>,
    pub auth: Arc<AuthService<dyn AuthRepository>>,
    pub blobs: Arc<dyn BlobStore>,
    pub listing_cfg: configs::ListingsConfig,
}

/// Backends the state is assembled from.
pub struct Backends {
    pub listings: Arc<dyn ListingRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub requests: Arc<dyn RequestRepository>,
    pub auth: Arc<dyn AuthRepository>,
    pub blobs: Arc<dyn BlobStore>,
}

impl ServerState {
    pub fn new(backends: Backends, cfg: &configs::AppConfig) -> Self {
        let timeout = Duration::from_secs(cfg.listings.fetch_timeout_secs);
        Self {
            listings: Arc::new(ListingService::new(backends.listings, timeout)),
            reviews: Arc::new(ReviewService::new(backends.reviews)),
            requests: Arc::new(RequestService::new(backends.requests)),
            auth: Arc::new(AuthService::new(backends.auth, AuthSettings::from_config(&cfg.auth))),
            blobs: backends.blobs,
            listing_cfg: cfg.listings.clone(),
        }
    }

    /// Postgres-backed state; uploads go to the configured blob store.
    pub fn from_db(db: DatabaseConnection, cfg: &configs::AppConfig) -> Self {
        let repo = Arc::new(SeaOrmListingRepository { db: db.clone() });
        let backends = Backends {
            listings: repo.clone(),
            reviews: repo.clone(),
            requests: repo,
            auth: Arc::new(SeaOrmAuthRepository { db }),
            blobs: upload::from_config(&cfg.storage),
        };
        Self::new(backends, cfg)
    }
}
