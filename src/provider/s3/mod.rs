//! # AWS S3 Client
//!
//! [`ObjectStore`] implementation backed by the official AWS Rust SDK.
//!
//! Works against AWS S3 and S3-compatible stores:
//! - static credentials and region from the resolved [`ClientConfig`]
//! - optional custom endpoint with path-style addressing
//! - optional TLS peer verification bypass for self-signed endpoints

mod error;
mod tls;

use crate::config::ClientConfig;
use crate::constants::CREDENTIALS_PROVIDER_NAME;
use crate::controller::fs::AtomicFile;
use crate::controller::locator::ObjectLocation;
use crate::error::Result;
use crate::provider::{ObjectHead, ObjectStore, StoreConnector, StoreError};
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region, SharedHttpClient};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client as S3Client;
use error::store_error;
use std::path::Path;
use tracing::{debug, info_span, Instrument};

/// Creates one [`S3ObjectStore`] per reconciliation
#[derive(Debug, Clone, Copy, Default)]
pub struct S3Connector;

#[async_trait]
impl StoreConnector for S3Connector {
    async fn connect(&self, config: &ClientConfig) -> Result<Box<dyn ObjectStore>, StoreError> {
        Ok(Box::new(S3ObjectStore::new(config)))
    }
}

/// AWS S3 provider implementation
pub struct S3ObjectStore {
    client: S3Client,
    region: String,
}

impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl S3ObjectStore {
    /// Create a new S3 client from a validated configuration.
    ///
    /// Only the values in `config` are applied. Ambient AWS settings
    /// (`AWS_ENDPOINT_URL`, `AWS_REGION`, shared profile files) are not read.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let http_client = config
            .endpoint()
            .filter(|endpoint| !endpoint.ssl_verify_peer)
            .map(|endpoint| tls::unverified_http_client(&endpoint.url));
        Self::build(config, http_client)
    }

    fn build(config: &ClientConfig, http_client: Option<SharedHttpClient>) -> Self {
        let credentials = Credentials::new(
            config.access_key_id(),
            config.secret_access_key(),
            None, // session token
            None, // expiration
            CREDENTIALS_PROVIDER_NAME,
        );

        let mut s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region().to_string()))
            .credentials_provider(credentials);

        if let Some(endpoint) = config.endpoint() {
            debug!(
                "Using S3-compatible endpoint {} (force_path_style={}, ssl_verify_peer={})",
                endpoint.url, endpoint.force_path_style, endpoint.ssl_verify_peer
            );
            s3_config = s3_config
                .endpoint_url(&endpoint.url)
                .force_path_style(endpoint.force_path_style);
        }

        if let Some(http_client) = http_client {
            s3_config = s3_config.http_client(http_client);
        }

        Self {
            client: S3Client::from_conf(s3_config.build()),
            region: config.region().to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn head(&self, location: &ObjectLocation) -> Result<ObjectHead, StoreError> {
        let span = info_span!(
            "s3.object.head",
            bucket = %location.bucket,
            key = %location.key,
            region = %self.region
        );

        async move {
            let output = self
                .client
                .head_object()
                .bucket(&location.bucket)
                .key(&location.key)
                .send()
                .await
                .map_err(store_error)?;

            let etag = output.e_tag().map(str::to_string).ok_or_else(|| {
                StoreError::new("MissingETag", format!("no ETag returned for {location}"))
            })?;

            Ok(ObjectHead {
                etag,
                content_length: output.content_length(),
            })
        }
        .instrument(span)
        .await
    }

    async fn get(&self, location: &ObjectLocation, destination: &Path) -> Result<u64> {
        let span = info_span!(
            "s3.object.get",
            bucket = %location.bucket,
            key = %location.key,
            destination = %destination.display()
        );

        async move {
            let output = self
                .client
                .get_object()
                .bucket(&location.bucket)
                .key(&location.key)
                .send()
                .await
                .map_err(store_error)?;

            let mut body = output.body;
            let mut file = AtomicFile::create(destination).await?;

            while let Some(chunk) = body.try_next().await.map_err(|e| {
                StoreError::new("StreamError", DisplayErrorContext(&e).to_string())
            })? {
                file.write(&chunk).await?;
            }

            let written = file.commit().await?;
            debug!("Wrote {} bytes to {}", written, destination.display());
            Ok(written)
        }
        .instrument(span)
        .await
    }
}
