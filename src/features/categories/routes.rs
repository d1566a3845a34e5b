use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Create admin routes for the categories feature
///
/// Note: Access control is left to the deployment (reverse proxy or gateway)
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/admin/blog/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/admin/blog/categories/options",
            get(handlers::get_category_options),
        )
        .route(
            "/api/admin/blog/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .with_state(service)
}
