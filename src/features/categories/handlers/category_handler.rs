use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, Lang};
use crate::features::categories::dtos::{
    CategoryInputDto, CategoryOptionDto, CategoryOptionsQuery, CategoryResponseDto,
    CategoryTreeDto,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::ApiResponse;

/// Query params for listing categories
#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    /// If true, return tree structure. Default: false (flat list)
    #[serde(default)]
    pub tree: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CategoryListDto {
    Flat(Vec<CategoryResponseDto>),
    Tree(Vec<CategoryTreeDto>),
}

/// List categories
///
/// Returns categories as flat list or tree structure based on `tree` query param.
#[utoipa::path(
    get,
    path = "/api/admin/blog/categories",
    params(
        ("tree" = Option<bool>, Query, description = "Return tree structure if true"),
        ("lang_id" = Option<i64>, Query, description = "Language, defaults to the site language")
    ),
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<CategoryListDto>),
    ),
    tag = "admin-categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    Lang(lang_id): Lang,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<ApiResponse<CategoryListDto>>> {
    let list = if query.tree {
        CategoryListDto::Tree(service.get_tree(lang_id).await?)
    } else {
        let categories = service.fetch_all(lang_id).await?;
        CategoryListDto::Flat(
            categories
                .into_iter()
                .map(|c| service.to_response(c))
                .collect(),
        )
    };

    Ok(Json(ApiResponse::success(Some(list), None, None)))
}

/// Indented category list for dropdowns
#[utoipa::path(
    get,
    path = "/api/admin/blog/categories/options",
    params(
        ("prompt" = Option<String>, Query, description = "Leading \"nothing selected\" entry"),
        ("lang_id" = Option<i64>, Query, description = "Language, defaults to the site language")
    ),
    responses(
        (status = 200, description = "Dropdown entries", body = ApiResponse<Vec<CategoryOptionDto>>),
    ),
    tag = "admin-categories"
)]
pub async fn get_category_options(
    State(service): State<Arc<CategoryService>>,
    Lang(lang_id): Lang,
    Query(query): Query<CategoryOptionsQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryOptionDto>>>> {
    let options = match query.prompt.as_deref() {
        Some(prompt) => service.get_prompt_options(lang_id, prompt).await?,
        None => service.get_options(lang_id).await?,
    };
    Ok(Json(ApiResponse::success(Some(options), None, None)))
}

/// Get every translation of a category
#[utoipa::path(
    get,
    path = "/api/admin/blog/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 404, description = "Category not found")
    ),
    tag = "admin-categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let translations = service.fetch_translations(id).await?;
    if translations.is_empty() {
        return Err(AppError::NotFound(format!("Category {} not found", id)));
    }

    let translations = translations
        .into_iter()
        .map(|c| service.to_response(c))
        .collect();
    Ok(Json(ApiResponse::success(Some(translations), None, None)))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/admin/blog/categories",
    request_body = CategoryInputDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Parent category not found")
    ),
    tag = "admin-categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CategoryInputDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let lang_id = dto.translations[0].lang_id;
    let id = service.add(dto).await?;
    let category = service
        .fetch_by_id(id, lang_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Category {} vanished after insert", id)))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(service.to_response(category)),
            Some("Category has been created".to_string()),
            None,
        )),
    ))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/admin/blog/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    request_body = CategoryInputDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category or parent not found"),
        (status = 409, description = "Parent would create a cycle"),
        (status = 502, description = "Old cover could not be removed")
    ),
    tag = "admin-categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<CategoryInputDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let lang_id = dto.translations[0].lang_id;
    if !service.update(id, dto).await? {
        return Err(AppError::DependencyFailure(
            "The current cover could not be removed".to_string(),
        ));
    }

    let category = service
        .fetch_by_id(id, lang_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

    Ok(Json(ApiResponse::success(
        Some(service.to_response(category)),
        Some("Category has been updated".to_string()),
        None,
    )))
}

/// Delete a category with its descendants and their posts
#[utoipa::path(
    delete,
    path = "/api/admin/blog/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found")
    ),
    tag = "admin-categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    if !service.delete_by_id(id).await? {
        return Err(AppError::NotFound(format!("Category {} not found", id)));
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("Category has been removed".to_string()),
        None,
    )))
}
