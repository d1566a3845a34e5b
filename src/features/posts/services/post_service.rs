use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::BreadcrumbDto;
use crate::features::categories::CategoryService;
use crate::features::posts::dtos::{
    format_publish_date, parse_publish_date, PostDetailDto, PostImageDto, PostInputDto,
    PostResponseDto, PostSettingsDto,
};
use crate::features::posts::models::{
    Post, PostDetail, PostFilter, PostFlag, PostRecord, PostTranslationRecord,
};
use crate::features::posts::repositories::PostRepository;
use crate::modules::history::HistoryWriter;
use crate::modules::storage::{CoverUpload, ImageStore};
use crate::modules::web_pages::{NewWebPage, WebPageRegistry};
use crate::shared::constants::{MODULE_NAME, POST_PAGE_LABEL, POST_PAGE_ROUTE};
use crate::shared::types::{Paginated, PaginationQuery};
use crate::shared::validation::slugify;

/// Service for post operations
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<CategoryService>,
    web_pages: Arc<dyn WebPageRegistry>,
    images: Arc<dyn ImageStore>,
    history: Option<Arc<dyn HistoryWriter>>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<CategoryService>,
        web_pages: Arc<dyn WebPageRegistry>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            posts,
            categories,
            web_pages,
            images,
            history: None,
        }
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryWriter>) -> Self {
        self.history = Some(history);
        self
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// One page of posts. Pages past the end are empty.
    pub async fn fetch_all_by_page(
        &self,
        filter: PostFilter,
        page: &PaginationQuery,
        lang_id: i64,
    ) -> Result<Paginated<Post>> {
        let (items, total) = self
            .posts
            .fetch_page(filter, lang_id, page.offset(), page.limit())
            .await?;

        Ok(Paginated {
            items,
            total,
            page: page.page(),
            per_page: page.limit(),
        })
    }

    /// Post with its related ids, gallery and, when asked, the related posts
    pub async fn fetch_by_id(
        &self,
        id: i64,
        with_attached: bool,
        lang_id: i64,
    ) -> Result<Option<PostDetail>> {
        let Some(post) = self.posts.fetch_by_id(id, lang_id).await? else {
            return Ok(None);
        };

        let attached_ids = self.posts.fetch_attached_ids(id).await?;
        let attached = if with_attached {
            self.posts.fetch_by_ids(&attached_ids, lang_id).await?
        } else {
            Vec::new()
        };
        let gallery = self.posts.fetch_gallery(id).await?;

        Ok(Some(PostDetail {
            post,
            attached_ids,
            attached,
            gallery,
        }))
    }

    pub async fn fetch_translations(&self, id: i64) -> Result<Vec<Post>> {
        self.posts.fetch_translations(id).await
    }

    /// Category trail followed by the post itself, unlinked
    pub async fn get_breadcrumbs(&self, post: &Post, lang_id: i64) -> Result<Vec<BreadcrumbDto>> {
        let mut breadcrumbs = self
            .categories
            .get_breadcrumbs(post.category_id, lang_id)
            .await?;

        breadcrumbs.push(BreadcrumbDto {
            name: post.name.clone(),
            link: None,
        });

        Ok(breadcrumbs)
    }

    pub fn to_response(&self, post: Post) -> PostResponseDto {
        let url = self.web_pages.surround(&post.slug, post.lang_id);
        let cover_url = post
            .cover
            .as_deref()
            .map(|cover| self.images.url(post.id, cover));

        PostResponseDto {
            id: post.id,
            category_id: post.category_id,
            category_name: post.category_name,
            lang_id: post.lang_id,
            web_page_id: post.web_page_id,
            name: post.name,
            title: post.title,
            slug: post.slug,
            url,
            introduction: post.introduction,
            full: post.full,
            keywords: post.keywords,
            meta_description: post.meta_description,
            timestamp: post.timestamp,
            date: format_publish_date(post.timestamp),
            published: post.published,
            comments: post.comments,
            seo: post.seo,
            views: post.views,
            cover: post.cover,
            cover_url,
        }
    }

    pub fn to_detail_response(
        &self,
        detail: PostDetail,
        breadcrumbs: Vec<BreadcrumbDto>,
    ) -> PostDetailDto {
        let post_id = detail.post.id;
        let gallery = detail
            .gallery
            .into_iter()
            .map(|image| PostImageDto {
                url: self.images.url(post_id, &image.image),
                id: image.id,
                order: image.order,
                image: image.image,
            })
            .collect();

        PostDetailDto {
            post: self.to_response(detail.post),
            attached_ids: detail.attached_ids,
            attached: detail
                .attached
                .into_iter()
                .map(|p| self.to_response(p))
                .collect(),
            gallery,
            breadcrumbs,
        }
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Create a post with all its translations and return the new id
    pub async fn add(&self, dto: PostInputDto) -> Result<i64> {
        let (mut record, cover) = prepare_input(&dto)?;
        self.ensure_category(record.category_id).await?;

        let id = self.posts.insert(&record).await?;

        if let Some(cover) = &cover {
            record.cover = Some(self.images.upload(id, cover).await?);
            self.posts.update(id, &record).await?;
        }

        for translation in &record.translations {
            let web_page_id = self.register_page(id, translation).await?;
            self.posts
                .attach_web_page(id, translation.lang_id, web_page_id)
                .await?;
        }

        if let Some(attached) = &dto.attached_ids {
            let attached = normalize_attached(id, attached);
            if !attached.is_empty() {
                self.posts.replace_attached(id, &attached).await?;
            }
        }

        let name = display_name(&record);
        self.track("Post \"%s\" has been added", name).await;
        info!("Post created: id={}, name={}", id, name);

        Ok(id)
    }

    /// Update a post. `Ok(false)` when the old cover could not be removed, in
    /// which case nothing is persisted.
    pub async fn update(&self, id: i64, dto: PostInputDto) -> Result<bool> {
        let existing = self.posts.fetch_translations(id).await?;
        let Some(current) = existing.first() else {
            return Err(AppError::NotFound(format!("Post {} not found", id)));
        };

        let (mut record, cover) = prepare_input(&dto)?;
        self.ensure_category(record.category_id).await?;

        record.cover = current.cover.clone();
        if dto.remove_cover {
            if !self.images.delete(id, None).await? {
                warn!("Could not remove covers of post {}", id);
            }
            record.cover = None;
        } else if let Some(cover) = &cover {
            if let Some(old) = current.cover.as_deref() {
                if !self.images.delete(id, Some(old)).await? {
                    warn!("Post {} update aborted: old cover '{}' not removed", id, old);
                    return Ok(false);
                }
            }
            record.cover = Some(self.images.upload(id, cover).await?);
        }

        if !self.posts.update(id, &record).await? {
            return Err(AppError::NotFound(format!("Post {} not found", id)));
        }

        for translation in &record.translations {
            let page = existing
                .iter()
                .find(|p| p.lang_id == translation.lang_id)
                .and_then(|p| p.web_page_id);

            match page {
                Some(web_page_id) => {
                    self.web_pages.update(web_page_id, &translation.slug).await?;
                }
                None => {
                    let web_page_id = self.register_page(id, translation).await?;
                    self.posts
                        .attach_web_page(id, translation.lang_id, web_page_id)
                        .await?;
                }
            }
        }

        let attached = normalize_attached(id, dto.attached_ids.as_deref().unwrap_or_default());
        self.posts.replace_attached(id, &attached).await?;

        let name = display_name(&record);
        self.track("Post \"%s\" has been updated", name).await;
        info!("Post updated: id={}, name={}", id, name);

        Ok(true)
    }

    pub async fn increment_view_count(&self, id: i64) -> Result<bool> {
        self.posts.increment_view_count(id).await
    }

    /// Apply the flags of each row. Stops at the first unknown post.
    pub async fn update_settings(&self, items: &[PostSettingsDto]) -> Result<bool> {
        let published: Vec<(i64, bool)> = items.iter().map(|i| (i.id, i.published)).collect();
        let comments: Vec<(i64, bool)> = items.iter().map(|i| (i.id, i.comments)).collect();
        let seo: Vec<(i64, bool)> = items.iter().map(|i| (i.id, i.seo)).collect();

        Ok(self.update_published(&published).await?
            && self.update_comments(&comments).await?
            && self.update_seo(&seo).await?)
    }

    pub async fn update_published(&self, items: &[(i64, bool)]) -> Result<bool> {
        self.update_flags(PostFlag::Published, items).await
    }

    pub async fn update_comments(&self, items: &[(i64, bool)]) -> Result<bool> {
        self.update_flags(PostFlag::Comments, items).await
    }

    pub async fn update_seo(&self, items: &[(i64, bool)]) -> Result<bool> {
        self.update_flags(PostFlag::Seo, items).await
    }

    /// Delete a post with its pages and images. `Ok(false)` when it does not
    /// exist.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let translations = self.posts.fetch_translations(id).await?;
        let Some(name) = translations.first().map(|p| p.name.clone()) else {
            return Ok(false);
        };

        for web_page_id in self.posts.fetch_web_page_ids(id).await? {
            self.web_pages.delete_by_id(web_page_id).await?;
        }
        if !self.images.delete(id, None).await? {
            warn!("Could not remove images of post {}", id);
        }

        let removed = self.posts.delete_by_id(id).await?;
        if removed {
            self.track("Post \"%s\" has been removed", &name).await;
            info!("Post deleted: id={}", id);
        }

        Ok(removed)
    }

    /// Delete posts in order, stopping at the first one that fails. Posts
    /// deleted before the failure stay deleted.
    pub async fn delete_by_ids(&self, ids: &[i64]) -> Result<bool> {
        for &id in ids {
            if !self.delete_by_id(id).await? {
                warn!("Batch removal stopped at post {}", id);
                return Ok(false);
            }
        }

        self.track("Batch removal of %s posts", &ids.len().to_string())
            .await;
        Ok(true)
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    async fn update_flags(&self, flag: PostFlag, items: &[(i64, bool)]) -> Result<bool> {
        for &(id, value) in items {
            if !self.posts.update_flag(id, flag, value).await? {
                warn!("Setting {} stopped at post {}", flag.column(), id);
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn ensure_category(&self, category_id: i64) -> Result<()> {
        if !self.categories.exists(category_id).await? {
            return Err(AppError::NotFound(format!(
                "Category {} not found",
                category_id
            )));
        }
        Ok(())
    }

    async fn register_page(&self, id: i64, translation: &PostTranslationRecord) -> Result<i64> {
        self.web_pages
            .add(NewWebPage {
                target_id: id,
                lang_id: translation.lang_id,
                slug: &translation.slug,
                module: POST_PAGE_LABEL,
                controller: POST_PAGE_ROUTE,
            })
            .await
    }

    async fn track(&self, template: &str, subject: &str) {
        if let Some(history) = &self.history {
            history.write(MODULE_NAME, template, subject).await;
        }
    }
}

fn prepare_input(dto: &PostInputDto) -> Result<(PostRecord, Option<CoverUpload>)> {
    let mut seen = HashSet::new();
    let mut translations = Vec::with_capacity(dto.translations.len());

    for t in &dto.translations {
        if !seen.insert(t.lang_id) {
            return Err(AppError::Validation(format!(
                "Duplicate translation for language {}",
                t.lang_id
            )));
        }

        let name = t.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Post name is required".to_string()));
        }

        let title = match t.title.trim() {
            "" => name,
            title => title,
        };
        let slug = match t.slug.trim() {
            "" => slugify(name),
            slug => slugify(slug),
        };

        translations.push(PostTranslationRecord {
            lang_id: t.lang_id,
            slug,
            name: name.to_string(),
            title: title.to_string(),
            introduction: t.introduction.clone(),
            full: t.full.clone(),
            keywords: t.keywords.clone(),
            meta_description: t.meta_description.clone(),
        });
    }

    if translations.is_empty() {
        return Err(AppError::Validation(
            "At least one translation is required".to_string(),
        ));
    }

    let cover = dto.cover.as_ref().map(|c| c.decode()).transpose()?;

    let record = PostRecord {
        category_id: dto.category_id,
        timestamp: parse_publish_date(&dto.date)?,
        published: dto.published,
        comments: dto.comments,
        seo: dto.seo,
        cover: None,
        translations,
    };

    Ok((record, cover))
}

/// Related ids without duplicates, the post itself or non-positive ids
fn normalize_attached(id: i64, attached: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    attached
        .iter()
        .copied()
        .filter(|&other| other > 0 && other != id && seen.insert(other))
        .collect()
}

fn display_name(record: &PostRecord) -> &str {
    record
        .translations
        .first()
        .map(|t| t.name.as_str())
        .unwrap_or_default()
}
