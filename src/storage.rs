use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tracing::debug;

use crate::config::StorageConfig;

/// Longest expiry S3 accepts for a presigned URL.
pub const MAX_SIGNED_URL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Where profile pictures live. Keys are opaque to the store; callers decide
/// the layout.
#[async_trait]
pub trait PictureStore: Send + Sync {
    async fn upload(&self, key: &str, picture: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
    /// Time-limited GET link for a stored picture.
    async fn signed_url(&self, key: &str, ttl: Duration) -> anyhow::Result<String>;
}

/// Clamps a requested link lifetime into what the presigner allows.
pub fn signed_url_ttl(requested: Duration) -> Duration {
    requested.clamp(Duration::from_secs(1), MAX_SIGNED_URL_TTL)
}

/// S3-compatible bucket (MinIO in development).
#[derive(Clone)]
pub struct S3PictureStore {
    client: Client,
    bucket: String,
}

impl S3PictureStore {
    pub async fn connect(config: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(Credentials::new(
                &config.access_key,
                &config.secret_key,
                None,
                None,
                "pantry-env",
            ))
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        // MinIO serves buckets by path, not by subdomain.
        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&config.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl PictureStore for S3PictureStore {
    async fn upload(&self, key: &str, picture: Bytes, content_type: &str) -> anyhow::Result<()> {
        let size = picture.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(picture))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("upload picture {key}"))?;
        debug!(%key, size, "picture uploaded");
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("remove picture {key}"))?;
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> anyhow::Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(signed_url_ttl(ttl))?)
            .await
            .with_context(|| format!("sign url for picture {key}"))?;
        Ok(presigned.uri().to_string())
    }
}
