//! Image uploads for listings and avatars.
//!
//! Objects are stored under `<uuid>.<ext>` and addressed by a public URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{ServiceError, ValidationErrors};
use common::metrics::UPLOADS_TOTAL;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub fn validate_image(content_type: &str, len: usize) -> Result<(), ServiceError> {
    let mut errs = ValidationErrors::new();
    errs.check(content_type.trim().to_ascii_lowercase().starts_with("image/"), "file", "Only image files are allowed");
    errs.check(len > 0, "file", "File is empty");
    errs.check(len <= MAX_IMAGE_BYTES, "file", "File size must be less than 5MB");
    errs.into_result()
}

/// `<uuid>.<ext>`, taking the extension from the file name and falling
/// back to the MIME subtype.
pub fn object_key(file_name: &str, content_type: &str) -> String {
    let from_name = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));
    let ext = match from_name {
        Some(e) => e.to_ascii_lowercase(),
        None => content_type
            .split('/')
            .nth(1)
            .map(|s| s.split(['+', ';']).next().unwrap_or(s).trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "bin".to_string()),
    };
    format!("{}.{}", Uuid::new_v4(), ext)
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return the object's public URL.
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, ServiceError>;
}

/// Validate and store an image, returning its public URL.
#[instrument(skip(store, image), fields(file_name = %image.file_name, size = image.bytes.len()))]
pub async fn upload_image(store: &dyn BlobStore, image: ImageUpload) -> Result<String, ServiceError> {
    validate_image(&image.content_type, image.bytes.len())?;
    let key = object_key(&image.file_name, &image.content_type);
    let url = store.put(&key, &image.content_type, image.bytes).await?;
    UPLOADS_TOTAL.inc();
    info!(%key, "image_uploaded");
    Ok(url)
}

/// Writes objects into a directory served as static files.
pub struct LocalBlobStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(dir: impl AsRef<Path>, public_base_url: &str) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), public_base_url: public_base_url.trim_end_matches('/').to_string() }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, _content_type: &str, bytes: Vec<u8>) -> Result<String, ServiceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ServiceError::Network(format!("create {}: {e}", self.dir.display())))?;
        let path = self.dir.join(key);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::Network(format!("write {}: {e}", path.display())))?;
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

/// Object storage reached over HTTP (`POST {endpoint}/object/{bucket}/{key}`).
pub struct HttpBlobStore {
    client: Client,
    endpoint: String,
    bucket: String,
    api_key: String,
}

impl HttpBlobStore {
    pub fn new(endpoint: &str, bucket: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/object/public/{}/{}", self.endpoint, self.bucket, key)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, ServiceError> {
        let url = format!("{}/object/{}/{}", self.endpoint, self.bucket, key);
        let mut rb = self.client.post(&url).header(reqwest::header::CONTENT_TYPE, content_type).body(bytes);
        if !self.api_key.is_empty() {
            rb = rb.bearer_auth(&self.api_key);
        }
        let resp = rb.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Network(format!("upload failed with {status}: {body}")));
        }
        Ok(self.public_url(key))
    }
}

/// Blob store selected by `[storage] backend`.
pub fn from_config(cfg: &configs::StorageConfig) -> Arc<dyn BlobStore> {
    match cfg.backend.as_str() {
        "http" => Arc::new(HttpBlobStore::new(&cfg.endpoint, &cfg.bucket, &cfg.api_key)),
        _ => Arc::new(LocalBlobStore::new(&cfg.local_dir, &cfg.public_base_url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_small_images_pass() {
        assert!(validate_image("image/png", 10).is_ok());
        assert!(validate_image("IMAGE/JPEG", MAX_IMAGE_BYTES).is_ok());
        assert!(validate_image("application/pdf", 10).is_err());
        assert!(validate_image("image/png", MAX_IMAGE_BYTES + 1).is_err());
        assert!(validate_image("image/png", 0).is_err());
    }

    #[test]
    fn key_extension_comes_from_name_then_mime() {
        assert!(object_key("Photo.JPG", "image/jpeg").ends_with(".jpg"));
        assert!(object_key("avatar", "image/svg+xml").ends_with(".svg"));
        assert!(object_key("noext.", "image/webp").ends_with(".webp"));
        let a = object_key("a.png", "image/png");
        let b = object_key("a.png", "image/png");
        assert_ne!(a, b);
    }

    #[test]
    fn http_public_url_layout() {
        let store = HttpBlobStore::new("https://storage.example.com/", "service-images", "");
        assert_eq!(
            store.public_url("k.png"),
            "https://storage.example.com/object/public/service-images/k.png"
        );
    }

    #[tokio::test]
    async fn local_store_writes_file_and_returns_public_url() {
        let dir = std::env::temp_dir().join(format!("chowk-blobs-{}", Uuid::new_v4()));
        let store = LocalBlobStore::new(&dir, "/service-images/");
        let image = ImageUpload { file_name: "shot.png".into(), content_type: "image/png".into(), bytes: vec![1, 2, 3] };
        let url = upload_image(&store, image).await.unwrap();
        let key = url.strip_prefix("/service-images/").unwrap();
        assert_eq!(tokio::fs::read(dir.join(key)).await.unwrap(), vec![1, 2, 3]);
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn rejected_upload_writes_nothing() {
        let dir = std::env::temp_dir().join(format!("chowk-blobs-{}", Uuid::new_v4()));
        let store = LocalBlobStore::new(&dir, "/service-images");
        let image = ImageUpload { file_name: "x.exe".into(), content_type: "application/octet-stream".into(), bytes: vec![0] };
        assert!(matches!(upload_image(&store, image).await, Err(ServiceError::Validation(_))));
        assert!(tokio::fs::metadata(&dir).await.is_err());
    }
}
