use sqlx::FromRow;

/// A post in one language: the shared row joined with its translation, the
/// slug of its web page and its category name
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Post {
    pub id: i64,
    pub category_id: i64,
    pub lang_id: i64,
    pub web_page_id: Option<i64>,
    pub slug: String,
    pub category_name: String,
    pub name: String,
    pub title: String,
    pub introduction: String,
    pub full: String,
    pub keywords: String,
    pub meta_description: String,
    /// Publish date, unix seconds
    pub timestamp: i64,
    pub published: bool,
    pub comments: bool,
    pub seo: bool,
    pub views: i64,
    pub cover: Option<String>,
}

/// Gallery image of a post
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PostImage {
    pub id: i64,
    pub post_id: i64,
    pub order: i32,
    pub image: String,
}

/// A post with everything its page shows
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    pub post: Post,
    pub attached_ids: Vec<i64>,
    pub attached: Vec<Post>,
    pub gallery: Vec<PostImage>,
}

/// Which posts a listing includes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Public listings only show published posts, newest first
    pub published_only: bool,
    pub category_id: Option<i64>,
}

impl PostFilter {
    pub fn published() -> Self {
        Self {
            published_only: true,
            category_id: None,
        }
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Boolean column toggled from the admin list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFlag {
    Published,
    Comments,
    Seo,
}

impl PostFlag {
    pub fn column(self) -> &'static str {
        match self {
            PostFlag::Published => "published",
            PostFlag::Comments => "comments",
            PostFlag::Seo => "seo",
        }
    }
}

/// What gets written for one language of a post
#[derive(Debug, Clone, PartialEq)]
pub struct PostTranslationRecord {
    pub lang_id: i64,
    pub slug: String,
    pub name: String,
    pub title: String,
    pub introduction: String,
    pub full: String,
    pub keywords: String,
    pub meta_description: String,
}

/// Normalized input of an add or update
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub category_id: i64,
    pub timestamp: i64,
    pub published: bool,
    pub comments: bool,
    pub seo: bool,
    pub cover: Option<String>,
    pub translations: Vec<PostTranslationRecord>,
}
