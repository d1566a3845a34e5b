use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, Lang};
use crate::features::posts::dtos::{
    DeletePostsDto, PostEditDto, PostInputDto, PostListQuery, PostResponseDto, PostSettingsDto,
};
use crate::features::posts::models::PostFilter;
use crate::features::posts::services::PostService;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// List posts, newest id first
#[utoipa::path(
    get,
    path = "/api/admin/blog/posts",
    params(
        PaginationQuery,
        PostListQuery,
        ("lang_id" = Option<i64>, Query, description = "Language, defaults to the site language")
    ),
    responses(
        (status = 200, description = "Page of posts", body = ApiResponse<Vec<PostResponseDto>>),
    ),
    tag = "admin-posts"
)]
pub async fn list_posts(
    State(service): State<Arc<PostService>>,
    Lang(lang_id): Lang,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<ApiResponse<Vec<PostResponseDto>>>> {
    let filter = PostFilter {
        published_only: false,
        category_id: query.category_id,
    };
    let page = service
        .fetch_all_by_page(filter, &pagination, lang_id)
        .await?;

    let meta = page.meta();
    let items = page.map(|p| service.to_response(p)).items;
    Ok(Json(ApiResponse::success(Some(items), None, Some(meta))))
}

/// List posts of one category
#[utoipa::path(
    get,
    path = "/api/admin/blog/categories/{id}/posts",
    params(
        ("id" = i64, Path, description = "Category ID"),
        PaginationQuery,
        ("lang_id" = Option<i64>, Query, description = "Language, defaults to the site language")
    ),
    responses(
        (status = 200, description = "Page of posts", body = ApiResponse<Vec<PostResponseDto>>),
    ),
    tag = "admin-posts"
)]
pub async fn list_category_posts(
    State(service): State<Arc<PostService>>,
    Lang(lang_id): Lang,
    Path(category_id): Path<i64>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<PostResponseDto>>>> {
    let filter = PostFilter::default().in_category(category_id);
    let page = service
        .fetch_all_by_page(filter, &pagination, lang_id)
        .await?;

    let meta = page.meta();
    let items = page.map(|p| service.to_response(p)).items;
    Ok(Json(ApiResponse::success(Some(items), None, Some(meta))))
}

/// Get every translation of a post
#[utoipa::path(
    get,
    path = "/api/admin/blog/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post found", body = ApiResponse<PostEditDto>),
        (status = 404, description = "Post not found")
    ),
    tag = "admin-posts"
)]
pub async fn get_post(
    State(service): State<Arc<PostService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PostEditDto>>> {
    let translations = service.fetch_translations(id).await?;
    let Some(first) = translations.first() else {
        return Err(AppError::NotFound(format!("Post {} not found", id)));
    };

    let attached_ids = service
        .fetch_by_id(id, false, first.lang_id)
        .await?
        .map(|detail| detail.attached_ids)
        .unwrap_or_default();

    let edit = PostEditDto {
        translations: translations
            .into_iter()
            .map(|p| service.to_response(p))
            .collect(),
        attached_ids,
    };
    Ok(Json(ApiResponse::success(Some(edit), None, None)))
}

/// Create a post
#[utoipa::path(
    post,
    path = "/api/admin/blog/posts",
    request_body = PostInputDto,
    responses(
        (status = 201, description = "Post created", body = ApiResponse<PostResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category not found")
    ),
    tag = "admin-posts"
)]
pub async fn create_post(
    State(service): State<Arc<PostService>>,
    AppJson(dto): AppJson<PostInputDto>,
) -> Result<(StatusCode, Json<ApiResponse<PostResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let lang_id = dto.translations[0].lang_id;
    let id = service.add(dto).await?;
    let detail = service
        .fetch_by_id(id, false, lang_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Post {} vanished after insert", id)))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(service.to_response(detail.post)),
            Some("Post has been created".to_string()),
            None,
        )),
    ))
}

/// Update a post
#[utoipa::path(
    put,
    path = "/api/admin/blog/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    request_body = PostInputDto,
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<PostResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Post or category not found"),
        (status = 502, description = "Old cover could not be removed")
    ),
    tag = "admin-posts"
)]
pub async fn update_post(
    State(service): State<Arc<PostService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<PostInputDto>,
) -> Result<Json<ApiResponse<PostResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let lang_id = dto.translations[0].lang_id;
    if !service.update(id, dto).await? {
        return Err(AppError::DependencyFailure(
            "The current cover could not be removed".to_string(),
        ));
    }

    let detail = service
        .fetch_by_id(id, false, lang_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

    Ok(Json(ApiResponse::success(
        Some(service.to_response(detail.post)),
        Some("Post has been updated".to_string()),
        None,
    )))
}

/// Delete a post
#[utoipa::path(
    delete,
    path = "/api/admin/blog/posts/{id}",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 404, description = "Post not found")
    ),
    tag = "admin-posts"
)]
pub async fn delete_post(
    State(service): State<Arc<PostService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    if !service.delete_by_id(id).await? {
        return Err(AppError::NotFound(format!("Post {} not found", id)));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("Post has been removed".to_string()),
        None,
    )))
}

/// Delete several posts
///
/// Stops at the first post that cannot be deleted; earlier ones stay deleted.
#[utoipa::path(
    post,
    path = "/api/admin/blog/posts/delete",
    request_body = DeletePostsDto,
    responses(
        (status = 200, description = "Posts deleted"),
        (status = 404, description = "A post was not found")
    ),
    tag = "admin-posts"
)]
pub async fn delete_posts(
    State(service): State<Arc<PostService>>,
    AppJson(dto): AppJson<DeletePostsDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if !service.delete_by_ids(&dto.ids).await? {
        return Err(AppError::NotFound(
            "Some posts could not be removed".to_string(),
        ));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("Selected posts have been removed".to_string()),
        None,
    )))
}

/// Save the published, comments and SEO flags of the admin list
#[utoipa::path(
    post,
    path = "/api/admin/blog/posts/settings",
    request_body = Vec<PostSettingsDto>,
    responses(
        (status = 200, description = "Settings saved"),
        (status = 404, description = "A post was not found")
    ),
    tag = "admin-posts"
)]
pub async fn update_settings(
    State(service): State<Arc<PostService>>,
    AppJson(items): AppJson<Vec<PostSettingsDto>>,
) -> Result<Json<ApiResponse<()>>> {
    if !service.update_settings(&items).await? {
        return Err(AppError::NotFound(
            "Settings stopped at an unknown post".to_string(),
        ));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("Settings have been updated".to_string()),
        None,
    )))
}
