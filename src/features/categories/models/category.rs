use sqlx::FromRow;

use crate::shared::tree::AdjacencyRow;

/// A category in one language: the shared row joined with its translation
/// and the slug of its web page
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub lang_id: i64,
    pub web_page_id: Option<i64>,
    pub slug: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub meta_description: String,
    pub order: i32,
    pub seo: bool,
    pub cover: Option<String>,
}

impl AdjacencyRow for Category {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    fn order(&self) -> i32 {
        self.order
    }
}

/// The minimum a breadcrumb trail needs
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CategoryBcRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub lang_id: i64,
    pub name: String,
    pub slug: String,
}

impl AdjacencyRow for CategoryBcRow {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }
}

/// Language independent shape of the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct CategoryNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub order: i32,
}

impl AdjacencyRow for CategoryNode {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }

    fn order(&self) -> i32 {
        self.order
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CategoryWithCount {
    pub id: i64,
    pub lang_id: i64,
    pub name: String,
    pub slug: String,
    pub post_count: i64,
}

/// What gets written for one language of a category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTranslationRecord {
    pub lang_id: i64,
    pub slug: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub meta_description: String,
}

/// Normalized input of an add or update
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    pub parent_id: Option<i64>,
    pub order: i32,
    pub seo: bool,
    pub cover: Option<String>,
    pub translations: Vec<CategoryTranslationRecord>,
}
