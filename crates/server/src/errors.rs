use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use service::auth::errors::AuthError;
use service::errors::{FieldError, ServiceError};

/// JSON error body: `{"error": <title>, "message": <detail>, "fields": [...]}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub message: Option<String>,
    pub fields: Vec<FieldError>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    fields: &'a [FieldError],
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, message: Option<String>) -> Self {
        Self { status, title, message, fields: Vec::new() }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("sign in required".into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(message.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.title, message: self.message.as_deref(), fields: &self.fields };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let msg = Some(e.to_string());
        let mapped = match e {
            ServiceError::Validation(v) => {
                let mut out = Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(v.to_string()));
                out.fields = v.fields;
                out
            }
            ServiceError::Auth(a) => match a {
                AuthError::Conflict => Self::new(StatusCode::CONFLICT, "Conflict", Some(a.to_string())),
                AuthError::ExpiredLink | AuthError::Validation(_) => {
                    Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(a.to_string()))
                }
                AuthError::Unauthorized | AuthError::NotFound => {
                    Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(a.to_string()))
                }
                AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                    Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(a.to_string()))
                }
            },
            ServiceError::Permission(_) => Self::new(StatusCode::FORBIDDEN, "Forbidden", msg),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", msg),
            ServiceError::Timeout(_) => Self::new(StatusCode::GATEWAY_TIMEOUT, "Timeout", msg),
            ServiceError::Network(_) => Self::new(StatusCode::BAD_GATEWAY, "Bad Gateway", msg),
            ServiceError::Db(_) | ServiceError::Model(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", msg)
            }
        };
        if mapped.status.is_server_error() {
            error!(status = %mapped.status, error = ?mapped.message, "request failed");
        } else {
            warn!(status = %mapped.status, error = ?mapped.message, "request rejected");
        }
        mapped
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
