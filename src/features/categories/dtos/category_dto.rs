use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::shared::types::CoverUploadDto;

/// One language of a category form
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryTranslationDto {
    pub lang_id: i64,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    #[schema(example = "Technology")]
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
    pub description: String,

    #[serde(default)]
    pub keywords: String,

    #[serde(default)]
    pub meta_description: String,
}

/// Request DTO for creating or updating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryInputDto {
    /// Parent category, `null` or `0` for a root category
    pub parent_id: Option<i64>,

    #[serde(default)]
    pub order: i32,

    #[serde(default = "default_true")]
    pub seo: bool,

    /// Drop the current cover (update only)
    #[serde(default)]
    pub remove_cover: bool,

    #[validate(nested)]
    pub cover: Option<CoverUploadDto>,

    #[validate(length(min = 1, message = "At least one translation is required"), nested)]
    pub translations: Vec<CategoryTranslationDto>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub lang_id: i64,
    pub web_page_id: Option<i64>,
    pub name: String,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub description: String,
    pub keywords: String,
    pub meta_description: String,
    pub order: i32,
    pub seo: bool,
    pub cover: Option<String>,
    pub cover_url: Option<String>,
}

/// Nested category for navigation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryTreeDto {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub url: String,
    pub order: i32,
    #[schema(no_recursion)]
    pub children: Vec<CategoryTreeDto>,
}

/// Dropdown entry; `id` is `None` only for the prompt entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryOptionDto {
    pub id: Option<i64>,
    #[schema(example = "— Artificial Intelligence")]
    pub label: String,
}

/// One step of a breadcrumb trail. The current page has no link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BreadcrumbDto {
    pub name: String,
    pub link: Option<String>,
}

/// Category with the number of posts filed under it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCountDto {
    pub id: i64,
    /// "Name (count)"
    #[schema(example = "Technology (12)")]
    pub title: String,
    pub url: String,
    pub post_count: i64,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CategoryOptionsQuery {
    /// Label of a leading "nothing selected" entry
    pub prompt: Option<String>,
}
