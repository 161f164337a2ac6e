use std::path::Path;

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{error, info, instrument};

use crate::{AssetStore, StorageError};

/// Connection settings for the S3 backend.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, LocalStack).
    pub endpoint_url: Option<String>,
    /// Public base (usually a CDN distribution) prepended to keys.
    pub distribution: Option<String>,
}

/// Object store backed by S3. One `PutObject` per upload.
#[derive(Clone)]
pub struct S3Store {
    client: S3Client,
    config: S3Config,
}

impl S3Store {
    pub async fn new(config: S3Config) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = S3ConfigBuilder::from(&aws_config);
        if let Some(ref endpoint) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = S3Client::from_conf(builder.build());

        info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint_url,
            "S3 store initialized"
        );

        Self { client, config }
    }

    async fn put(&self, key: &str, body: ByteStream, content_type: &str) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, bucket = %self.config.bucket, key = %key, "S3 upload failed");
                StorageError::Upload {
                    key: key.to_string(),
                    message: e.to_string(),
                }
            })?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl AssetStore for S3Store {
    #[instrument(skip(self, body), fields(bucket = %self.config.bucket, size_bytes = body.len()))]
    async fn put_bytes(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.put(key, ByteStream::from(body), content_type).await?;
        info!(key = %key, "object uploaded");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: format!("open {}: {e}", path.display()),
            })?;
        self.put(key, body, content_type).await?;
        info!(key = %key, "object uploaded");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        object_url(&self.config, key)
    }
}

fn object_url(config: &S3Config, key: &str) -> String {
    match (&config.distribution, &config.endpoint_url) {
        (Some(dist), _) => format!("{}/{}", dist.trim_end_matches('/'), key),
        (None, Some(endpoint)) => {
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), config.bucket, key)
        }
        (None, None) => format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            config.bucket, config.region, key
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> S3Config {
        S3Config {
            bucket: "tubely-media".into(),
            region: "us-east-2".into(),
            endpoint_url: None,
            distribution: None,
        }
    }

    #[test]
    fn url_prefers_distribution() {
        let mut cfg = config();
        cfg.distribution = Some("https://d111111abcdef8.cloudfront.net/".into());
        assert_eq!(
            object_url(&cfg, "landscape/a.mp4"),
            "https://d111111abcdef8.cloudfront.net/landscape/a.mp4"
        );
    }

    #[test]
    fn url_for_custom_endpoint_is_path_style() {
        let mut cfg = config();
        cfg.endpoint_url = Some("http://localhost:9000".into());
        assert_eq!(
            object_url(&cfg, "a.png"),
            "http://localhost:9000/tubely-media/a.png"
        );
    }

    #[test]
    fn url_defaults_to_virtual_hosted_aws() {
        assert_eq!(
            object_url(&config(), "portrait/b.mp4"),
            "https://tubely-media.s3.us-east-2.amazonaws.com/portrait/b.mp4"
        );
    }
}
