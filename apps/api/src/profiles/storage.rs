use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::profiles::artifact::GroupProfileSet;

pub const LATEST_KEY: &str = "profiles/latest.json";

pub fn artifact_key(version: &str) -> String {
    format!("profiles/{version}.json")
}

/// Durable home for built profile sets.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persists `set` under its version key and returns that key. Does not move
    /// the latest pointer.
    async fn save_version(&self, set: &GroupProfileSet) -> Result<String>;

    /// Makes `set` the artifact that `load_latest` returns.
    async fn promote_latest(&self, set: &GroupProfileSet) -> Result<()>;

    /// The latest artifact, or `None` if nothing has been built yet.
    async fn load_latest(&self) -> Result<Option<GroupProfileSet>>;
}

pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    async fn put_json(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload of '{key}' failed: {e}"))?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn save_version(&self, set: &GroupProfileSet) -> Result<String> {
        let body = serde_json::to_vec(set).context("Failed to serialize profile set")?;
        let key = artifact_key(&set.version);

        self.put_json(&key, body).await?;

        info!("Uploaded profile set to s3://{}/{}", self.bucket, key);
        Ok(key)
    }

    async fn promote_latest(&self, set: &GroupProfileSet) -> Result<()> {
        let body = serde_json::to_vec(set).context("Failed to serialize profile set")?;
        self.put_json(LATEST_KEY, body).await?;

        info!(version = %set.version, "Promoted profile set to s3://{}/{}", self.bucket, LATEST_KEY);
        Ok(())
    }

    async fn load_latest(&self) -> Result<Option<GroupProfileSet>> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(LATEST_KEY)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|e| e.is_no_such_key())
                    .unwrap_or(false)
                {
                    return Ok(None);
                }
                return Err(anyhow::anyhow!("S3 download of '{LATEST_KEY}' failed: {err}"));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .context("Failed to read profile artifact body")?
            .into_bytes();
        let set = serde_json::from_slice(&bytes).context("Profile artifact is not valid JSON")?;
        Ok(Some(set))
    }
}
