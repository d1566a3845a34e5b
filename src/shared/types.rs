use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::modules::storage::CoverUpload;
use crate::shared::constants::{ALLOWED_IMAGE_TYPES, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::validation::sanitize_file_name;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub page_count: i64,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Standard pagination query parameters for all list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Page number clamped to at least 1
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Calculate SQL OFFSET from page number, saturating for huge pages
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    /// Get clamped page_size (respects MAX_PAGE_SIZE)
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of a listing plus the numbers a paginator needs
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Paginated<T> {
    pub fn page_count(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn meta(&self) -> Meta {
        Meta {
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            page_count: self.page_count(),
        }
    }
}

// =============================================================================
// UPLOADS
// =============================================================================

/// Cover image sent inline with a create or update request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CoverUploadDto {
    #[validate(length(min = 1, max = 255, message = "File name must be 1-255 characters"))]
    #[schema(example = "cover.jpg")]
    pub file_name: String,

    #[schema(example = "image/jpeg")]
    pub content_type: String,

    /// File contents, standard base64
    pub data: String,
}

impl CoverUploadDto {
    pub fn decode(&self) -> Result<CoverUpload> {
        let file_name = sanitize_file_name(&self.file_name)
            .ok_or_else(|| AppError::Validation("Invalid cover file name".to_string()))?;

        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(AppError::Validation(format!(
                "Unsupported cover type '{}'",
                self.content_type
            )));
        }

        let data = BASE64
            .decode(self.data.trim())
            .map_err(|e| AppError::Validation(format!("Cover is not valid base64: {}", e)))?;

        if data.is_empty() {
            return Err(AppError::Validation("Cover file is empty".to_string()));
        }

        Ok(CoverUpload {
            file_name,
            content_type: self.content_type.clone(),
            data,
        })
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}
