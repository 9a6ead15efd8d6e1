//! Listing repository backed by the marketplace's own JSON API.

use std::sync::RwLock;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::auth::errors::AuthError;
use crate::errors::{ServiceError, ValidationErrors};
use crate::listing::domain::{ListingForm, ListingPage, ServiceListing};
use crate::listing::query::QueryDescription;
use crate::listing::repository::ListingRepository;
use crate::listing::view::ListingDetail;

pub struct HttpListingRepository {
    client: Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    fields: Vec<crate::errors::FieldError>,
}

/// Decode a JSON body, mapping API error statuses back onto `ServiceError`.
pub(crate) async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }
    Err(error_from(resp).await)
}

pub(crate) async fn error_from(resp: Response) -> ServiceError {
    let status = resp.status();
    let body: Option<ErrorBody> = resp.json().await.ok();
    let message = body
        .as_ref()
        .and_then(|b| b.message.clone().or_else(|| b.error.clone()))
        .unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::BAD_REQUEST => match body {
            Some(b) if !b.fields.is_empty() => ServiceError::Validation(ValidationErrors { fields: b.fields }),
            _ => ServiceError::Validation(ValidationErrors::single("form", message)),
        },
        StatusCode::UNAUTHORIZED => ServiceError::Auth(AuthError::Unauthorized),
        StatusCode::CONFLICT => ServiceError::Auth(AuthError::Conflict),
        StatusCode::FORBIDDEN => ServiceError::Permission(message),
        StatusCode::NOT_FOUND => ServiceError::NotFound(message),
        _ => ServiceError::Network(format!("{status}: {message}")),
    }
}

pub(crate) fn parse_base(base_url: &str) -> Result<Url, ServiceError> {
    // a trailing slash keeps `join` from dropping the last path segment
    let normalized = if base_url.ends_with('/') { base_url.to_string() } else { format!("{base_url}/") };
    Url::parse(&normalized).map_err(|e| ServiceError::Network(format!("invalid base url '{base_url}': {e}")))
}

impl HttpListingRepository {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Ok(Self::with_client(Client::new(), parse_base(base_url)?))
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url, token: RwLock::new(None) }
    }

    /// Bearer token sent with owner-scoped calls.
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut t) = self.token.write() {
            *t = token;
        }
    }

    fn url(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ServiceError::Network(format!("invalid path '{path}': {e}")))
    }

    fn authorized(&self, rb: RequestBuilder) -> RequestBuilder {
        match self.token.read().ok().and_then(|t| t.clone()) {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }
}

#[async_trait::async_trait]
impl ListingRepository for HttpListingRepository {
    async fn find_page(&self, query: &QueryDescription) -> Result<ListingPage, ServiceError> {
        let rb = if query.owner.is_some() {
            self.authorized(self.client.get(self.url("api/dashboard")?))
        } else {
            self.client.get(self.url("api/services")?).query(&query.to_query_pairs())
        };
        debug!(owner = ?query.owner, "remote listing page");
        read_json(rb.send().await?).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceListing>, ServiceError> {
        let resp = self.authorized(self.client.get(self.url(&format!("api/services/{id}"))?)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let detail: ListingDetail = read_json(resp).await?;
        Ok(Some(detail.listing))
    }

    async fn insert(&self, _owner: Uuid, form: &ListingForm) -> Result<ServiceListing, ServiceError> {
        let rb = self.authorized(self.client.post(self.url("api/services")?)).json(form);
        read_json(rb.send().await?).await
    }

    async fn update_owned(&self, id: Uuid, _owner: Uuid, form: &ListingForm) -> Result<ServiceListing, ServiceError> {
        let rb = self.authorized(self.client.put(self.url(&format!("api/services/{id}"))?)).json(form);
        read_json(rb.send().await?).await
    }

    async fn delete_owned(&self, id: Uuid, _owner: Uuid) -> Result<(), ServiceError> {
        let resp = self.authorized(self.client.delete(self.url(&format!("api/services/{id}"))?)).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(error_from(resp).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_keeps_path_prefix() {
        let repo = HttpListingRepository::new("http://localhost:8080/market").unwrap();
        assert_eq!(repo.url("/api/services").unwrap().as_str(), "http://localhost:8080/market/api/services");
    }

    #[test]
    fn invalid_base_url_is_a_network_error() {
        assert!(matches!(HttpListingRepository::new("not a url"), Err(ServiceError::Network(_))));
    }
}
