use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::BreadcrumbDto;
use crate::shared::constants::DATE_FORMAT;
use crate::shared::types::CoverUploadDto;

/// One language of a post form
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PostTranslationDto {
    pub lang_id: i64,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    #[schema(example = "Getting started with Rust")]
    pub name: String,

    /// Page title, defaults to the name
    #[serde(default)]
    #[validate(length(max = 255, message = "Title must not exceed 255 characters"))]
    pub title: String,

    /// Requested slug, derived from the name when empty
    #[serde(default)]
    #[validate(length(max = 255, message = "Slug must not exceed 255 characters"))]
    pub slug: String,

    #[serde(default)]
    pub introduction: String,

    #[serde(default)]
    pub full: String,

    #[serde(default)]
    pub keywords: String,

    #[serde(default)]
    pub meta_description: String,
}

/// Request DTO for creating or updating a post
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PostInputDto {
    pub category_id: i64,

    /// Publish date as MM/DD/YYYY
    #[validate(length(min = 1, message = "Date is required"))]
    #[schema(example = "07/21/2024")]
    pub date: String,

    #[serde(default = "default_true")]
    pub published: bool,

    #[serde(default = "default_true")]
    pub comments: bool,

    #[serde(default = "default_true")]
    pub seo: bool,

    /// Drop the current cover (update only)
    #[serde(default)]
    pub remove_cover: bool,

    #[validate(nested)]
    pub cover: Option<CoverUploadDto>,

    /// Related posts. On update, omitting the field drops every link.
    pub attached_ids: Option<Vec<i64>>,

    #[validate(length(min = 1, message = "At least one translation is required"), nested)]
    pub translations: Vec<PostTranslationDto>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostResponseDto {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub lang_id: i64,
    pub web_page_id: Option<i64>,
    pub name: String,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub introduction: String,
    pub full: String,
    pub keywords: String,
    pub meta_description: String,
    pub timestamp: i64,
    /// Publish date as MM/DD/YYYY
    pub date: String,
    pub published: bool,
    pub comments: bool,
    pub seo: bool,
    pub views: i64,
    pub cover: Option<String>,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostImageDto {
    pub id: i64,
    pub order: i32,
    pub image: String,
    pub url: String,
}

/// A post page: the post, related posts, gallery and breadcrumbs
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostDetailDto {
    pub post: PostResponseDto,
    pub attached_ids: Vec<i64>,
    pub attached: Vec<PostResponseDto>,
    pub gallery: Vec<PostImageDto>,
    pub breadcrumbs: Vec<BreadcrumbDto>,
}

/// Everything the admin edit form needs
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostEditDto {
    pub translations: Vec<PostResponseDto>,
    pub attached_ids: Vec<i64>,
}

/// Flags of one row of the admin list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct PostSettingsDto {
    pub id: i64,
    pub published: bool,
    pub comments: bool,
    pub seo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DeletePostsDto {
    #[validate(length(min = 1, message = "At least one id is required"))]
    pub ids: Vec<i64>,
}

/// Query params for post listings
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PostListQuery {
    /// Restrict to one category
    pub category_id: Option<i64>,
}

/// Parses a MM/DD/YYYY publish date into unix seconds at UTC midnight
pub fn parse_publish_date(date: &str) -> Result<i64> {
    let day = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected MM/DD/YYYY", date)))?;

    Ok(day.and_time(chrono::NaiveTime::MIN).and_utc().timestamp())
}

pub fn format_publish_date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
