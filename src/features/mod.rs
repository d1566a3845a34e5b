//! Blog features: admin category and post management plus the public site.

pub mod categories;
pub mod posts;
pub mod site;

use std::sync::Arc;

use axum::Router;

use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::posts::{routes as posts_routes, PostService};
use crate::features::site::{routes as site_routes, SiteState};

/// Every blog route. Handlers resolve the request language through the
/// `Extension<Arc<BlogConfig>>` layer the caller installs.
pub fn router(
    categories: Arc<CategoryService>,
    posts: Arc<PostService>,
    site: SiteState,
) -> Router {
    Router::new()
        .merge(categories_routes::routes(categories))
        .merge(posts_routes::routes(posts))
        .merge(site_routes::routes(site))
}
