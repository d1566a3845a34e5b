use axum::{routing::get, Router};

use crate::features::site::handlers::{self, SiteState};

/// Create routes for the public blog
///
/// Note: This feature is public (no authentication required)
pub fn routes(state: SiteState) -> Router {
    Router::new()
        .route("/api/blog", get(handlers::list_published))
        .route("/api/blog/categories", get(handlers::list_categories))
        .route("/api/blog/categories/{id}", get(handlers::get_category_page))
        .route("/api/blog/posts/{id}", get(handlers::get_post_page))
        .route("/api/blog/recent", get(handlers::list_recent))
        .route("/api/blog/popular", get(handlers::list_popular))
        .route("/api/blog/random", get(handlers::get_random))
        .with_state(state)
}
