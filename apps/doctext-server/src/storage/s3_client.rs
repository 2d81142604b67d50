//! S3-compatible storage client
//!
//! Wraps the AWS SDK for S3-compatible storage access.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata},
    operation::get_object::GetObjectError,
    primitives::ByteStream,
    Client,
};

use crate::config::StorageConfig;
use crate::error::StorageError;

use super::types::{Lookup, ObjectStore};

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from configuration
    ///
    /// Static credentials and a custom endpoint are optional. Without them the
    /// default AWS provider chain and endpoint resolution are used.
    pub async fn new(config: &StorageConfig) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .endpoint_url(endpoint)
                .force_path_style(true); // Required for MinIO and other S3-compatible services
        }

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            builder = builder.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "doctext",
            ));
        }

        let client = Client::from_conf(builder.build());
        let bucket = config.bucket.clone();

        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    DisplayErrorContext(&e)
                );
            }
        }

        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn get(&self, key: &str) -> Result<Lookup, StorageError> {
        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let not_found = e
                    .as_service_error()
                    .is_some_and(GetObjectError::is_no_such_key)
                    || e.raw_response().is_some_and(|r| r.status().as_u16() == 404);
                if not_found {
                    return Ok(Lookup::Miss);
                }
                if e.code() == Some("AccessDenied") {
                    return Err(StorageError::AccessDenied(key.to_string()));
                }
                return Err(StorageError::SdkError(format!(
                    "Failed to get object {}: {}",
                    key,
                    DisplayErrorContext(&e)
                )));
            }
        };

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to read object body {}: {}", key, e)))?
            .into_bytes()
            .to_vec();

        Ok(Lookup::Hit(data))
    }

    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                if e.code() == Some("AccessDenied") {
                    StorageError::AccessDenied(key.to_string())
                } else {
                    StorageError::SdkError(format!(
                        "Failed to put object {}: {}",
                        key,
                        DisplayErrorContext(&e)
                    ))
                }
            })?;

        Ok(())
    }
}
