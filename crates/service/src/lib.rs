//! Service layer for the marketplace: listing search and mutation, reviews,
//! service requests, accounts and the client-side stores built on them.
//! - Separates business logic from data access behind repository traits.
//! - Reuses entity definitions and catalog data from the `models` crate.
//! - Every backend (SeaORM, remote HTTP, in-memory mock) plugs into the same services.

pub mod errors;
pub mod filters;
pub mod rating;
pub mod pagination;
pub mod notify;
pub mod listing;
pub mod reviews;
pub mod requests;
pub mod upload;
pub mod auth;
#[cfg(test)]
pub mod test_support;
