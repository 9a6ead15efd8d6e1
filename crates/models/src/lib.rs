pub mod catalog;
pub mod db;
pub mod errors;
pub mod profile;
pub mod review;
pub mod service;
pub mod service_request;
pub mod user_credentials;
