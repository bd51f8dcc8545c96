//! S3 adapter - implements `ArtifactStore` with multipart progress reporting.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use tokio::io::AsyncReadExt as _;

use crate::application::ports::{ArtifactStore, UploadProgress};
use crate::domain::TransferProgress;

/// Upload part size. Files at or below one part go through a single
/// `PutObject`; anything larger is a multipart upload with per-part progress.
const PART_SIZE: usize = 8 * 1024 * 1024;

/// Artifact storage adapter backed by S3.
pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
}

impl S3ArtifactStore {
    #[must_use]
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
        }
    }

    async fn put_whole(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .with_context(|| format!("opening {}", path.display()))?;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .context("S3 PutObject")?;
        Ok(())
    }

    async fn put_multipart(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        total: u64,
        on_progress: UploadProgress<'_>,
    ) -> Result<()> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .context("S3 CreateMultipartUpload")?;
        let upload_id = created
            .upload_id()
            .ok_or_else(|| anyhow!("S3 returned no multipart upload id"))?
            .to_owned();

        match self
            .put_parts(bucket, key, &upload_id, path, total, on_progress)
            .await
        {
            Ok(parts) => {
                self.client
                    .complete_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    )
                    .send()
                    .await
                    .context("S3 CompleteMultipartUpload")?;
                Ok(())
            }
            Err(err) => {
                // Orphaned parts are billed until aborted.
                let _ = self
                    .client
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await;
                Err(err)
            }
        }
    }

    async fn put_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        path: &Path,
        total: u64,
        on_progress: UploadProgress<'_>,
    ) -> Result<Vec<CompletedPart>> {
        let mut file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("opening {}", path.display()))?;
        let mut progress = TransferProgress::new(total);
        let mut parts = Vec::new();
        let mut part_number: i32 = 1;
        loop {
            let chunk = read_part(&mut file)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            if chunk.is_empty() {
                break;
            }
            let len = chunk.len() as u64;
            let uploaded = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(chunk))
                .send()
                .await
                .with_context(|| format!("S3 UploadPart {part_number}"))?;
            parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .set_e_tag(uploaded.e_tag().map(str::to_owned))
                    .build(),
            );
            let (done, so_far_of) = progress.advance(len);
            on_progress(done, so_far_of);
            part_number += 1;
        }
        Ok(parts)
    }
}

impl ArtifactStore for S3ArtifactStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        on_progress: UploadProgress<'_>,
    ) -> Result<()> {
        let total = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("reading metadata for {}", path.display()))?
            .len();
        if total <= PART_SIZE as u64 {
            self.put_whole(bucket, key, path).await?;
            on_progress(total, total);
            return Ok(());
        }
        self.put_multipart(bucket, key, path, total, on_progress)
            .await
    }
}

/// Read up to one part from `file`. Short reads are filled until the part is
/// complete or EOF.
async fn read_part(file: &mut tokio::fs::File) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; PART_SIZE];
    let mut filled = 0;
    while filled < buf.len() {
        let read = file.read(&mut buf[filled..]).await?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    buf.truncate(filled);
    Ok(buf)
}
