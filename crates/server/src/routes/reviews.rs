use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use service::requests::{RequestForm, ServiceRequest};
use service::reviews::{Review, ReviewForm};

use crate::errors::JsonApiError;
use crate::extract::MaybeUser;
use crate::state::ServerState;

#[utoipa::path(get, path = "/api/services/{id}/reviews", tag = "reviews", params(("id" = Uuid, Path,)), responses((status = 200, description = "Reviews, newest first")))]
pub async fn list(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<Vec<Review>>, JsonApiError> {
    Ok(Json(state.reviews.list(id).await?))
}

#[utoipa::path(
    post, path = "/api/services/{id}/reviews", tag = "reviews",
    params(("id" = Uuid, Path,)),
    request_body = crate::openapi::ReviewFormDoc,
    responses((status = 201, description = "Review stored"), (status = 401, description = "Unauthorized"), (status = 403, description = "Own service"))
)]
pub async fn submit(
    State(state): State<ServerState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<Uuid>,
    Json(form): Json<ReviewForm>,
) -> Result<(StatusCode, Json<Review>), JsonApiError> {
    let listing = state.listings.get(id).await?;
    let review = state.reviews.submit(user, &listing, &form).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[utoipa::path(
    post, path = "/api/services/{id}/requests", tag = "reviews",
    params(("id" = Uuid, Path,)),
    request_body = crate::openapi::RequestFormDoc,
    responses((status = 201, description = "Request sent"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn request(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(form): Json<RequestForm>,
) -> Result<(StatusCode, Json<ServiceRequest>), JsonApiError> {
    let listing = state.listings.get(id).await?;
    let sent = state.requests.submit(&listing, &form).await?;
    Ok((StatusCode::CREATED, Json(sent)))
}
