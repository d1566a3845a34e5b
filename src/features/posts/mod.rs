//! Blog posts: translated articles filed under a category, with covers,
//! related posts and a gallery.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/blog/posts` | Paginated list, newest id first |
//! | POST | `/api/admin/blog/posts` | Create post |
//! | GET | `/api/admin/blog/posts/{id}` | All translations and related ids |
//! | PUT | `/api/admin/blog/posts/{id}` | Update post |
//! | DELETE | `/api/admin/blog/posts/{id}` | Delete post |
//! | POST | `/api/admin/blog/posts/delete` | Delete several posts |
//! | POST | `/api/admin/blog/posts/settings` | Save list flags |
//! | GET | `/api/admin/blog/categories/{id}/posts` | Posts of one category |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::PostService;
