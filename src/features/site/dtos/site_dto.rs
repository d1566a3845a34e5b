use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::categories::dtos::{BreadcrumbDto, CategoryResponseDto};
use crate::features::posts::dtos::PostResponseDto;

/// A public category page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryPageDto {
    pub category: CategoryResponseDto,
    /// Direct subcategories
    pub children: Vec<CategoryResponseDto>,
    pub breadcrumbs: Vec<BreadcrumbDto>,
    /// Current page of published posts, see `meta`
    pub posts: Vec<PostResponseDto>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number (1-indexed, default: 1)
    pub page: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct WidgetQuery {
    /// Number of posts, defaults to BLOG_RECENT_LIMIT
    pub limit: Option<i64>,
    /// Restrict recent posts to one category
    pub category_id: Option<i64>,
}
