//! S3 object store
//!
//! Supports AWS S3 and S3-compatible storage (MinIO, Wasabi, DigitalOcean Spaces).

use crate::error::{Result, SyncError};
use crate::store::ObjectStore;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// S3 bucket accessed through the AWS SDK
pub struct S3Store {
    /// S3 client
    client: Client,
    /// Bucket name
    bucket: String,
}

impl S3Store {
    /// Create a store from shared SDK configuration and an optional endpoint
    pub fn new(sdk_config: &SdkConfig, bucket: impl Into<String>, endpoint: Option<&str>) -> Self {
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(sdk_config);

        // Configure custom endpoint for S3-compatible storage
        if let Some(endpoint_url) = endpoint {
            debug!("Using custom S3 endpoint: {}", endpoint_url);
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint_url)
                .force_path_style(true); // Required for MinIO and many S3-compatible services
        }

        Self {
            client: Client::from_conf(s3_config_builder.build()),
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<()> {
        debug!("Uploading {} bytes to {}", body.len(), self.location(key));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| SyncError::store("put_object", key, e.into_service_error()))?;

        Ok(())
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<()> {
        debug!("Streaming {} to {}", path.display(), self.location(key));

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| SyncError::store("put_object", key, e))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| SyncError::store("put_object", key, e.into_service_error()))?;

        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        debug!("Listing {}", self.location(prefix));

        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);

            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| SyncError::store("list_objects", prefix, e.into_service_error()))?;

            if let Some(contents) = resp.contents {
                keys.extend(contents.into_iter().filter_map(|object| object.key));
            }

            continuation_token =
                next_page_token(prefix, resp.is_truncated, resp.next_continuation_token)?;
            if continuation_token.is_none() {
                break;
            }
        }

        debug!("Found {} objects under {}", keys.len(), prefix);
        Ok(keys)
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| SyncError::store("get_object", key, e.into_service_error()))?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| SyncError::store("get_object", key, e))?;

        let data = body.into_bytes().to_vec();
        debug!("Downloaded {} bytes from {}", data.len(), self.location(key));
        Ok(data)
    }

    async fn download_to(&self, key: &str, dest: &Path) -> Result<u64> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| SyncError::store("get_object", key, e.into_service_error()))?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| SyncError::io("create", dest, e))?;

        let mut reader = resp.body.into_async_read();
        let written = tokio::io::copy(&mut reader, &mut file)
            .await
            .map_err(|e| SyncError::io("write", dest, e))?;
        file.flush()
            .await
            .map_err(|e| SyncError::io("write", dest, e))?;

        debug!("Streamed {} bytes from {} to {}", written, self.location(key), dest.display());
        Ok(written)
    }
}

/// Token for the next ListObjectsV2 page, or `None` when the listing is complete
fn next_page_token(
    prefix: &str,
    is_truncated: Option<bool>,
    token: Option<String>,
) -> Result<Option<String>> {
    if is_truncated != Some(true) {
        return Ok(None);
    }
    token.map(Some).ok_or_else(|| {
        SyncError::store(
            "list_objects",
            prefix,
            "truncated listing without a continuation token",
        )
    })
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}
