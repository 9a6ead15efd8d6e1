//! Auth module: three-layer architecture (domain, repository, service),
//! plus the client-side session store.
//!
//! Accounts are email + password; every account owns one profile whose id
//! is the account id.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;
pub mod session;

pub use service::AuthService;
pub use session::SessionStore;
