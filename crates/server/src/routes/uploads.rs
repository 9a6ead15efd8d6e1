use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use service::upload::{self, ImageUpload};

use crate::errors::JsonApiError;
use crate::extract::CurrentUser;
use crate::state::ServerState;

pub const FILE_NAME_HEADER: &str = "x-file-name";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadOutput {
    pub url: String,
}

#[utoipa::path(
    post, path = "/api/uploads", tag = "uploads",
    request_body(content = Vec<u8>, content_type = "image/*"),
    responses((status = 201, description = "Stored; returns the public URL"), (status = 400, description = "Not an image or too large"))
)]
pub async fn upload(
    State(state): State<ServerState>,
    CurrentUser(_user): CurrentUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadOutput>), JsonApiError> {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    let image = ImageUpload {
        file_name: header_str(FILE_NAME_HEADER),
        content_type: header_str(header::CONTENT_TYPE.as_str()),
        bytes: body.to_vec(),
    };
    let url = upload::upload_image(state.blobs.as_ref(), image).await?;
    Ok((StatusCode::CREATED, Json(UploadOutput { url })))
}
