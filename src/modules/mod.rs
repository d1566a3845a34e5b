//! Modules layer - Infrastructure components for external integrations
//!
//! Image storage, the slug/web page registry and the activity history the
//! blog services depend on.

pub mod history;
pub mod storage;
pub mod web_pages;
