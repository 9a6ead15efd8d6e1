//! Service listings: domain types, the query builder, repository seam and
//! its backends, the stateless service and the client-side store.

pub mod domain;
pub mod query;
pub mod repo;
pub mod repository;
pub mod service;
pub mod store;
pub mod view;

pub use domain::{ListingForm, ListingPage, ServiceListing};
pub use service::ListingService;
pub use store::{FetchOutcome, ListingState, ListingStore};
