use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::config::BlogConfig;
use crate::core::error::{AppError, Result};
use crate::core::extractor::Lang;
use crate::features::categories::dtos::CategoryCountDto;
use crate::features::categories::CategoryService;
use crate::features::posts::dtos::{PostDetailDto, PostResponseDto};
use crate::features::posts::models::PostFilter;
use crate::features::posts::PostService;
use crate::features::site::dtos::{CategoryPageDto, PageQuery, WidgetQuery};
use crate::features::site::services::SiteService;
use crate::shared::constants::MAX_PAGE_SIZE;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// Shared state of the public blog routes
#[derive(Clone)]
pub struct SiteState {
    pub site: Arc<SiteService>,
    pub categories: Arc<CategoryService>,
    pub posts: Arc<PostService>,
    pub config: Arc<BlogConfig>,
}

impl SiteState {
    fn page(&self, query: &PageQuery) -> PaginationQuery {
        PaginationQuery::new(query.page.unwrap_or(1), self.config.per_page)
    }

    fn widget_limit(&self, query: &WidgetQuery) -> i64 {
        query
            .limit
            .unwrap_or(self.config.recent_limit)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// Published posts, newest first
#[utoipa::path(
    get,
    path = "/api/blog",
    params(
        PageQuery,
        ("lang_id" = Option<i64>, Query, description = "Language, defaults to the site language")
    ),
    responses(
        (status = 200, description = "Page of published posts", body = ApiResponse<Vec<PostResponseDto>>),
    ),
    tag = "blog"
)]
pub async fn list_published(
    State(state): State<SiteState>,
    Lang(lang_id): Lang,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<PostResponseDto>>>> {
    let page = state
        .posts
        .fetch_all_by_page(PostFilter::published(), &state.page(&query), lang_id)
        .await?;

    let meta = page.meta();
    let items = page.map(|p| state.posts.to_response(p)).items;
    Ok(Json(ApiResponse::success(Some(items), None, Some(meta))))
}

/// Categories with their published post count
#[utoipa::path(
    get,
    path = "/api/blog/categories",
    params(
        ("lang_id" = Option<i64>, Query, description = "Language, defaults to the site language")
    ),
    responses(
        (status = 200, description = "Categories", body = ApiResponse<Vec<CategoryCountDto>>),
    ),
    tag = "blog"
)]
pub async fn list_categories(
    State(state): State<SiteState>,
    Lang(lang_id): Lang,
) -> Result<Json<ApiResponse<Vec<CategoryCountDto>>>> {
    let categories = state.site.get_all_categories_with_count(lang_id).await?;
    Ok(Json(ApiResponse::success(Some(categories), None, None)))
}

/// A category page: the category, its subcategories, breadcrumbs and a page
/// of its published posts
#[utoipa::path(
    get,
    path = "/api/blog/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID"),
        PageQuery,
        ("lang_id" = Option<i64>, Query, description = "Language, defaults to the site language")
    ),
    responses(
        (status = 200, description = "Category page", body = ApiResponse<CategoryPageDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "blog"
)]
pub async fn get_category_page(
    State(state): State<SiteState>,
    Lang(lang_id): Lang,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<CategoryPageDto>>> {
    let category = state
        .categories
        .fetch_by_id(id, lang_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

    let breadcrumbs = state.categories.get_breadcrumbs(id, lang_id).await?;
    let children = state
        .categories
        .fetch_children_by_parent_id(id, lang_id)
        .await?
        .into_iter()
        .map(|c| state.categories.to_response(c))
        .collect();

    let page = state
        .posts
        .fetch_all_by_page(
            PostFilter::published().in_category(id),
            &state.page(&query),
            lang_id,
        )
        .await?;
    let meta = page.meta();
    let posts = page.map(|p| state.posts.to_response(p)).items;

    let body = CategoryPageDto {
        category: state.categories.to_response(category),
        children,
        breadcrumbs,
        posts,
    };
    Ok(Json(ApiResponse::success(Some(body), None, Some(meta))))
}

/// A post page. Counts as a view.
#[utoipa::path(
    get,
    path = "/api/blog/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID"),
        ("lang_id" = Option<i64>, Query, description = "Language, defaults to the site language")
    ),
    responses(
        (status = 200, description = "Post page", body = ApiResponse<PostDetailDto>),
        (status = 404, description = "Post not found")
    ),
    tag = "blog"
)]
pub async fn get_post_page(
    State(state): State<SiteState>,
    Lang(lang_id): Lang,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PostDetailDto>>> {
    let detail = state
        .posts
        .fetch_by_id(id, true, lang_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

    let breadcrumbs = state.posts.get_breadcrumbs(&detail.post, lang_id).await?;
    let body = state.posts.to_detail_response(detail, breadcrumbs);

    state.posts.increment_view_count(id).await?;

    Ok(Json(ApiResponse::success(Some(body), None, None)))
}

/// Newest published posts
#[utoipa::path(
    get,
    path = "/api/blog/recent",
    params(
        WidgetQuery,
        ("lang_id" = Option<i64>, Query, description = "Language, defaults to the site language")
    ),
    responses(
        (status = 200, description = "Recent posts", body = ApiResponse<Vec<PostResponseDto>>),
    ),
    tag = "blog"
)]
pub async fn list_recent(
    State(state): State<SiteState>,
    Lang(lang_id): Lang,
    Query(query): Query<WidgetQuery>,
) -> Result<Json<ApiResponse<Vec<PostResponseDto>>>> {
    let posts = state
        .site
        .get_recent(state.widget_limit(&query), query.category_id, lang_id)
        .await?;

    let posts = posts
        .into_iter()
        .map(|p| state.posts.to_response(p))
        .collect();
    Ok(Json(ApiResponse::success(Some(posts), None, None)))
}

/// Most viewed published posts
#[utoipa::path(
    get,
    path = "/api/blog/popular",
    params(
        WidgetQuery,
        ("lang_id" = Option<i64>, Query, description = "Language, defaults to the site language")
    ),
    responses(
        (status = 200, description = "Popular posts", body = ApiResponse<Vec<PostResponseDto>>),
    ),
    tag = "blog"
)]
pub async fn list_popular(
    State(state): State<SiteState>,
    Lang(lang_id): Lang,
    Query(query): Query<WidgetQuery>,
) -> Result<Json<ApiResponse<Vec<PostResponseDto>>>> {
    let posts = state
        .site
        .get_mostly_viewed(state.widget_limit(&query), lang_id)
        .await?;

    let posts = posts
        .into_iter()
        .map(|p| state.posts.to_response(p))
        .collect();
    Ok(Json(ApiResponse::success(Some(posts), None, None)))
}

/// One random published post
#[utoipa::path(
    get,
    path = "/api/blog/random",
    params(
        ("lang_id" = Option<i64>, Query, description = "Language, defaults to the site language")
    ),
    responses(
        (status = 200, description = "Random post", body = ApiResponse<PostResponseDto>),
        (status = 404, description = "No published posts")
    ),
    tag = "blog"
)]
pub async fn get_random(
    State(state): State<SiteState>,
    Lang(lang_id): Lang,
) -> Result<Json<ApiResponse<PostResponseDto>>> {
    let post = state
        .site
        .get_random(lang_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No published posts".to_string()))?;

    Ok(Json(ApiResponse::success(
        Some(state.posts.to_response(post)),
        None,
        None,
    )))
}
