//! Caller identity from `Authorization: Bearer <jwt>` or the `auth_token` cookie.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::ServerState;

pub const AUTH_COOKIE: &str = "auth_token";

/// A signed-in caller; rejects with 401 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

/// The caller if signed in. Invalid tokens count as anonymous.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<Uuid>);

/// Raw token from the request, header first.
pub fn token_from_parts(parts: &Parts) -> Option<String> {
    if let Some(h) = parts.headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return h.strip_prefix("Bearer ").map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    }
    CookieJar::from_headers(&parts.headers)
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or_else(JsonApiError::unauthorized)?;
        match state.auth.verify_token(&token) {
            Ok(id) => Ok(CurrentUser(id)),
            Err(e) => {
                debug!(path = %parts.uri.path(), error = %e, "token validation failed");
                Err(JsonApiError::unauthorized())
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<ServerState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(token_from_parts(parts).and_then(|t| state.auth.verify_token(&t).ok())))
    }
}
