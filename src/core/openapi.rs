use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::posts::{dtos as posts_dtos, handlers as posts_handlers};
use crate::features::site::{dtos as site_dtos, handlers as site_handlers};
use crate::shared::types::{ApiResponse, CoverUploadDto, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories (admin)
        categories_handlers::list_categories,
        categories_handlers::get_category_options,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Posts (admin)
        posts_handlers::list_posts,
        posts_handlers::list_category_posts,
        posts_handlers::get_post,
        posts_handlers::create_post,
        posts_handlers::update_post,
        posts_handlers::delete_post,
        posts_handlers::delete_posts,
        posts_handlers::update_settings,
        // Blog (public)
        site_handlers::list_published,
        site_handlers::list_categories,
        site_handlers::get_category_page,
        site_handlers::get_post_page,
        site_handlers::list_recent,
        site_handlers::list_popular,
        site_handlers::get_random,
    ),
    components(
        schemas(
            // Shared
            Meta,
            CoverUploadDto,
            // Categories
            categories_dtos::CategoryTranslationDto,
            categories_dtos::CategoryInputDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::CategoryOptionDto,
            categories_dtos::BreadcrumbDto,
            categories_dtos::CategoryCountDto,
            categories_handlers::CategoryListDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<Vec<categories_dtos::CategoryOptionDto>>,
            ApiResponse<Vec<categories_dtos::CategoryCountDto>>,
            ApiResponse<categories_handlers::CategoryListDto>,
            // Posts
            posts_dtos::PostTranslationDto,
            posts_dtos::PostInputDto,
            posts_dtos::PostResponseDto,
            posts_dtos::PostImageDto,
            posts_dtos::PostDetailDto,
            posts_dtos::PostEditDto,
            posts_dtos::PostSettingsDto,
            posts_dtos::DeletePostsDto,
            ApiResponse<posts_dtos::PostResponseDto>,
            ApiResponse<Vec<posts_dtos::PostResponseDto>>,
            ApiResponse<posts_dtos::PostDetailDto>,
            ApiResponse<posts_dtos::PostEditDto>,
            // Site
            site_dtos::CategoryPageDto,
            ApiResponse<site_dtos::CategoryPageDto>,
        )
    ),
    tags(
        (name = "admin-categories", description = "Blog category management"),
        (name = "admin-posts", description = "Blog post management"),
        (name = "blog", description = "Public blog pages and widgets"),
    ),
    info(
        title = "Blog API",
        version = "0.1.0",
        description = "API documentation for the blog module",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
