//! MinIO/S3-compatible storage client
//!
//! Stores blog cover images under `{prefix}/{namespace}/{owner_id}/{file}`.
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::config::MinIOConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::{CoverUpload, ImageStore};

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    prefix: String,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration and make sure the
    /// bucket exists
    pub async fn new(config: MinIOConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            prefix: config.prefix,
        };

        client.ensure_bucket_exists().await?;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.prefix
        );

        Ok(client)
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<()> {
        match Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    /// Key prefix of every object owned by `owner_id` in `namespace`
    pub fn owner_prefix(&self, namespace: &str, owner_id: i64) -> String {
        format!("{}/{}/{}/", self.prefix, namespace, owner_id)
    }

    /// Upload an object
    pub async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        self.bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| {
                AppError::DependencyFailure(format!("Failed to upload file '{}': {}", key, e))
            })?;

        debug!("Uploaded file '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    /// Delete a single object
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.bucket.delete_object(key).await.map_err(|e| {
            AppError::DependencyFailure(format!("Failed to delete file '{}': {}", key, e))
        })?;

        debug!("Deleted file '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    /// Delete every object under `prefix`
    pub async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let listing = self.bucket.list(prefix.to_string(), None).await.map_err(|e| {
            AppError::DependencyFailure(format!("Failed to list '{}': {}", prefix, e))
        })?;

        let mut removed = 0;
        for page in listing {
            for object in page.contents {
                self.delete(&object.key).await?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Public URL of an object
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }
}

/// Cover image store backed by MinIO, one namespace per content kind
pub struct S3ImageStore {
    client: Arc<MinIOClient>,
    namespace: &'static str,
}

impl S3ImageStore {
    pub fn new(client: Arc<MinIOClient>, namespace: &'static str) -> Self {
        Self { client, namespace }
    }

    fn key(&self, owner_id: i64, file_name: &str) -> String {
        format!("{}{}", self.client.owner_prefix(self.namespace, owner_id), file_name)
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn upload(&self, owner_id: i64, file: &CoverUpload) -> Result<String> {
        let key = self.key(owner_id, &file.file_name);
        self.client
            .upload(&key, &file.data, &file.content_type)
            .await?;
        Ok(file.file_name.clone())
    }

    async fn delete(&self, owner_id: i64, file_name: Option<&str>) -> Result<bool> {
        let outcome = match file_name {
            Some(name) => self.client.delete(&self.key(owner_id, name)).await.map(|_| 1),
            None => {
                self.client
                    .delete_prefix(&self.client.owner_prefix(self.namespace, owner_id))
                    .await
            }
        };

        match outcome {
            Ok(removed) => {
                debug!(
                    "Removed {} image(s) of {}/{}",
                    removed, self.namespace, owner_id
                );
                Ok(true)
            }
            Err(e) => {
                warn!(
                    "Image removal failed for {}/{}: {}",
                    self.namespace, owner_id, e
                );
                Ok(false)
            }
        }
    }

    fn url(&self, owner_id: i64, file_name: &str) -> String {
        self.client.public_url(&self.key(owner_id, file_name))
    }
}
