//! Contact requests sent to a listing owner. No sign-in required.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{is_email, ServiceError, ValidationErrors};
use crate::listing::domain::ServiceListing;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub service_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<models::service_request::Model> for ServiceRequest {
    fn from(m: models::service_request::Model) -> Self {
        Self {
            id: m.id,
            service_id: m.service_id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            message: m.message,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
}

impl RequestForm {
    pub fn phone(&self) -> Option<String> {
        self.phone.as_ref().map(|p| p.trim().to_string()).filter(|p| !p.is_empty())
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = ValidationErrors::new();
        errs.check(self.name.trim().chars().count() >= 2, "name", "Name must be at least 2 characters");
        errs.check(is_email(&self.email), "email", "Please enter a valid email");
        errs.check(self.message.trim().chars().count() >= 10, "message", "Message must be at least 10 characters");
        errs.into_result()
    }
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn insert_request(&self, service_id: Uuid, form: &RequestForm) -> Result<ServiceRequest, ServiceError>;
}

pub struct RequestService<R: RequestRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: RequestRepository + ?Sized> RequestService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, listing, form), fields(service_id = %listing.id))]
    pub async fn submit(&self, listing: &ServiceListing, form: &RequestForm) -> Result<ServiceRequest, ServiceError> {
        form.validate()?;
        let request = self.repo.insert_request(listing.id, form).await?;
        info!(request_id = %request.id, "service_request_sent");
        Ok(request)
    }
}
