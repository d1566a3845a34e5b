//! Public blog surface: listings, category and post pages, sidebar widgets.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/blog` | Published posts, paginated |
//! | GET | `/api/blog/categories` | Categories with post counts |
//! | GET | `/api/blog/categories/{id}` | Category page |
//! | GET | `/api/blog/posts/{id}` | Post page (counts a view) |
//! | GET | `/api/blog/recent` | Newest posts |
//! | GET | `/api/blog/popular` | Most viewed posts |
//! | GET | `/api/blog/random` | A random post |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use handlers::SiteState;
pub use services::SiteService;
