//! S3-compatible object store

use super::ObjectStore;
use crate::config::StoreConfig;
use crate::domain::{Result, StoreError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use secrecy::ExposeSecret;
use std::collections::BTreeSet;
use tracing::debug;

/// [`ObjectStore`] backed by an S3-compatible bucket
///
/// Works against AWS proper or any S3-compatible endpoint (`endpoint_url`
/// plus path-style addressing). Artifacts are written world-readable since
/// crawlers fetch them directly.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build a client from the store section of the configuration
    ///
    /// Static credentials from the configuration take precedence; otherwise
    /// the ambient provider chain (environment, profile, instance role) is
    /// used.
    pub async fn new(config: &StoreConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.expose_secret().as_ref().to_string(),
                None,
                None,
                "static-config",
            ));
        }

        let shared = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list(&self, prefix: &str) -> Result<BTreeSet<String>> {
        let mut keys = BTreeSet::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = &continuation {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| {
                StoreError::ListFailed(format!("{}", DisplayErrorContext(&e)))
            })?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    keys.insert(key.to_string());
                }
            }

            if response.is_truncated().unwrap_or(false) {
                continuation = response.next_continuation_token().map(str::to_string);
                if continuation.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        debug!(prefix = prefix, objects = keys.len(), "Listed bucket objects");
        Ok(keys)
    }

    async fn write(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(content))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StoreError::WriteFailed {
                key: key.to_string(),
                message: format!("{}", DisplayErrorContext(&e)),
            })?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::DeleteFailed {
                key: key.to_string(),
                message: format!("{}", DisplayErrorContext(&e)),
            })?;
        Ok(())
    }
}
