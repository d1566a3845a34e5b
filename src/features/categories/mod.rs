//! Blog categories: hierarchical, translated, each with a public web page.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/blog/categories` | Flat list or tree (`?tree=true`) |
//! | POST | `/api/admin/blog/categories` | Create category |
//! | GET | `/api/admin/blog/categories/options` | Indented dropdown entries |
//! | GET | `/api/admin/blog/categories/{id}` | Get category |
//! | PUT | `/api/admin/blog/categories/{id}` | Update category |
//! | DELETE | `/api/admin/blog/categories/{id}` | Delete category, descendants and posts |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::CategoryService;
