use std::sync::Arc;

use crate::core::error::Result;
use crate::features::categories::dtos::CategoryCountDto;
use crate::features::categories::CategoryService;
use crate::features::posts::models::Post;
use crate::features::posts::repositories::PostRepository;
use crate::modules::web_pages::WebPageRegistry;

/// Read-only widgets of the public blog: recent, random and popular posts,
/// category list with counts
pub struct SiteService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<CategoryService>,
    web_pages: Arc<dyn WebPageRegistry>,
}

impl SiteService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<CategoryService>,
        web_pages: Arc<dyn WebPageRegistry>,
    ) -> Self {
        Self {
            posts,
            categories,
            web_pages,
        }
    }

    pub async fn get_recent(
        &self,
        limit: i64,
        category_id: Option<i64>,
        lang_id: i64,
    ) -> Result<Vec<Post>> {
        self.posts.fetch_recent(limit, category_id, lang_id).await
    }

    pub async fn get_random(&self, lang_id: i64) -> Result<Option<Post>> {
        self.posts.fetch_random_published(lang_id).await
    }

    pub async fn get_mostly_viewed(&self, limit: i64, lang_id: i64) -> Result<Vec<Post>> {
        self.posts.fetch_mostly_viewed(limit, lang_id).await
    }

    /// Categories titled "Name (count)", counting published posts only
    pub async fn get_all_categories_with_count(&self, lang_id: i64) -> Result<Vec<CategoryCountDto>> {
        let rows = self.categories.fetch_all_with_count(lang_id, true).await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryCountDto {
                id: row.id,
                title: format!("{} ({})", row.name, row.post_count),
                url: self.web_pages.surround(&row.slug, row.lang_id),
                post_count: row.post_count,
            })
            .collect())
    }
}
