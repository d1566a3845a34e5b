use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::posts::handlers;
use crate::features::posts::services::PostService;

/// Create admin routes for the posts feature
///
/// Note: Access control is left to the deployment (reverse proxy or gateway)
pub fn routes(service: Arc<PostService>) -> Router {
    Router::new()
        .route(
            "/api/admin/blog/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route("/api/admin/blog/posts/delete", post(handlers::delete_posts))
        .route(
            "/api/admin/blog/posts/settings",
            post(handlers::update_settings),
        )
        .route(
            "/api/admin/blog/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route(
            "/api/admin/blog/categories/{id}/posts",
            get(handlers::list_category_posts),
        )
        .with_state(service)
}
