//! Storage module for blog images
//!
//! Defines the image store contract used by the category and post services
//! and its MinIO/S3-compatible implementation.

mod minio_client;

use async_trait::async_trait;

use crate::core::error::Result;

pub use minio_client::{MinIOClient, S3ImageStore};

/// An uploaded image waiting to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverUpload {
    /// Sanitized file name the image is stored and recorded under
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Stores images per owner (category or post id)
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `file` for `owner_id` and return the stored file name
    async fn upload(&self, owner_id: i64, file: &CoverUpload) -> Result<String>;

    /// Remove one image, or every image of the owner when `file_name` is
    /// `None`. `Ok(false)` means the store could not remove it.
    async fn delete(&self, owner_id: i64, file_name: Option<&str>) -> Result<bool>;

    /// Public URL of a stored image
    fn url(&self, owner_id: i64, file_name: &str) -> String;
}
