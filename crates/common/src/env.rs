//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::debug;

/// Create the directory local image uploads are written to. Other storage
/// backends need nothing on disk.
pub async fn ensure_upload_dir(backend: &str, upload_dir: &str) -> anyhow::Result<()> {
    if backend != "local" {
        debug!(%backend, "remote image storage; no upload directory needed");
        return Ok(());
    }
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {upload_dir}: {e}"))?;
    Ok(())
}
