use axum::extract::State;
use axum::Json;

use service::auth::domain::{Profile, ProfileUpdate};

use crate::errors::JsonApiError;
use crate::extract::CurrentUser;
use crate::state::ServerState;

#[utoipa::path(get, path = "/api/profile", tag = "profile", responses((status = 200, description = "Profile"), (status = 401, description = "Unauthorized")))]
pub async fn get(State(state): State<ServerState>, CurrentUser(user): CurrentUser) -> Result<Json<Profile>, JsonApiError> {
    Ok(Json(state.auth.get_profile(user).await?))
}

#[utoipa::path(put, path = "/api/profile", tag = "profile", request_body = crate::openapi::ProfileUpdateDoc, responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error")))]
pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, JsonApiError> {
    Ok(Json(state.auth.update_profile(user, user, update).await?))
}
