use crate::services::dedup::RemoteObjectState;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::BucketAccelerateStatus;
use std::path::Path;
use tracing::debug;

/// Object metadata key the uploader stamps the bundle digest into and the
/// probe reads back. Both sides carry hex SHA-256; the dedup comparison only
/// works because the encoding is identical on both ends.
pub const CONTENT_DIGEST_METADATA_KEY: &str = "content-sha256";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Metadata lookup for `key`. "Not found" and "forbidden" answers are
    /// reported as an absent object, not as errors.
    async fn object_state(&self, key: &str) -> Result<RemoteObjectState>;

    /// Whether the bucket has transfer acceleration enabled.
    async fn accelerate_enabled(&self) -> Result<bool>;

    /// Switches the client onto the accelerated endpoint for the rest of the
    /// invocation.
    fn enable_accelerate(&mut self);

    /// Uploads the file at `path` under `key`, stamping `content_digest`
    /// into the object metadata when known.
    async fn put_file(&self, key: &str, path: &Path, content_digest: Option<&str>) -> Result<()>;
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn object_state(&self, key: &str) -> Result<RemoteObjectState> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(head) => {
                let digest = head
                    .metadata()
                    .and_then(|meta| meta.get(CONTENT_DIGEST_METADATA_KEY))
                    .cloned();
                Ok(RemoteObjectState::present(digest))
            }
            Err(e) => {
                let status = e.raw_response().map(|r| r.status().as_u16());
                let service_error = e.into_service_error();
                // 403 is how S3 hides nonexistent objects from callers
                // without ListBucket, so it cannot confirm existence either.
                if service_error.is_not_found() || matches!(status, Some(403) | Some(404)) {
                    debug!(key, ?status, "object not visible; treating as absent");
                    Ok(RemoteObjectState::absent())
                } else {
                    Err(anyhow!(service_error))
                }
            }
        }
    }

    async fn accelerate_enabled(&self) -> Result<bool> {
        let res = self
            .client
            .get_bucket_accelerate_configuration()
            .bucket(&self.bucket)
            .send()
            .await?;
        Ok(res.status() == Some(&BucketAccelerateStatus::Enabled))
    }

    fn enable_accelerate(&mut self) {
        let config = self.client.config().to_builder().accelerate(true).build();
        self.client = Client::from_conf(config);
    }

    async fn put_file(&self, key: &str, path: &Path, content_digest: Option<&str>) -> Result<()> {
        let body = ByteStream::from_path(path).await?;
        let mut req = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body);
        if let Some(digest) = content_digest {
            req = req.metadata(CONTENT_DIGEST_METADATA_KEY, digest);
        }
        req.send().await?;
        Ok(())
    }
}
