//! Artifact upload to the staging bucket.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{ArtifactStore, UploadProgress};
use crate::domain::ProvisionError;

/// Upload the build artifact at `path` to `bucket`/`key`.
///
/// `on_progress` receives `(bytes_done, bytes_total)` as the transfer
/// advances. Returns the number of bytes uploaded.
///
/// # Errors
///
/// Returns [`ProvisionError::ArtifactMissing`] if `path` is not a file, or
/// the storage error if the transfer fails. There is no resume or retry.
pub async fn upload(
    store: &impl ArtifactStore,
    path: &Path,
    bucket: &str,
    key: &str,
    on_progress: UploadProgress<'_>,
) -> Result<u64> {
    if !path.is_file() {
        return Err(ProvisionError::ArtifactMissing(path.to_path_buf()).into());
    }
    let total = std::fs::metadata(path)
        .with_context(|| format!("reading metadata for {}", path.display()))?
        .len();
    store
        .put_object(bucket, key, path, on_progress)
        .await
        .with_context(|| format!("uploading {} to s3://{bucket}/{key}", path.display()))?;
    Ok(total)
}
