//! In-memory collaborators and fixtures for service and router tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{Extension, Router};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use fake::faker::lorem::en::{Sentence, Words};
use fake::Fake;

use crate::core::config::BlogConfig;
use crate::core::error::Result;
use crate::features::categories::dtos::{CategoryInputDto, CategoryTranslationDto};
use crate::features::categories::models::{
    Category, CategoryBcRow, CategoryNode, CategoryRecord, CategoryTranslationRecord,
    CategoryWithCount,
};
use crate::features::categories::repositories::CategoryRepository;
use crate::features::categories::CategoryService;
use crate::features::posts::dtos::{PostInputDto, PostTranslationDto};
use crate::features::posts::models::{
    Post, PostFilter, PostFlag, PostImage, PostRecord, PostTranslationRecord,
};
use crate::features::posts::repositories::PostRepository;
use crate::features::posts::PostService;
use crate::features::site::{SiteService, SiteState};
use crate::modules::history::{render_message, HistoryWriter};
use crate::modules::storage::{CoverUpload, ImageStore};
use crate::modules::web_pages::{base_slug, unique_slug, NewWebPage, UrlBuilder, WebPageRegistry};
use crate::shared::types::CoverUploadDto;

pub const TEST_SITE_URL: &str = "https://blog.test";

// =============================================================================
// WEB PAGES
// =============================================================================

struct WebPage {
    lang_id: i64,
    slug: String,
}

pub struct InMemoryWebPages {
    pages: Mutex<BTreeMap<i64, WebPage>>,
    urls: UrlBuilder,
}

impl InMemoryWebPages {
    pub fn new() -> Arc<Self> {
        let codes = HashMap::from([(1, "en".to_string()), (2, "ru".to_string())]);
        Arc::new(Self {
            pages: Mutex::new(BTreeMap::new()),
            urls: UrlBuilder::new(TEST_SITE_URL, 1, codes),
        })
    }

    pub fn len(&self) -> usize {
        self.pages.lock().unwrap().len()
    }

    pub fn slug(&self, web_page_id: i64) -> Option<String> {
        self.pages
            .lock()
            .unwrap()
            .get(&web_page_id)
            .map(|p| p.slug.clone())
    }

    fn free_slug(pages: &BTreeMap<i64, WebPage>, base: &str, lang_id: i64, skip: i64) -> String {
        let taken: HashSet<String> = pages
            .iter()
            .filter(|(id, p)| **id != skip && p.lang_id == lang_id)
            .map(|(_, p)| p.slug.clone())
            .collect();
        unique_slug(base, &taken)
    }
}

#[async_trait]
impl WebPageRegistry for InMemoryWebPages {
    async fn add(&self, page: NewWebPage<'_>) -> Result<i64> {
        let mut pages = self.pages.lock().unwrap();
        let base = base_slug(page.slug, page.target_id);
        let slug = Self::free_slug(&pages, &base, page.lang_id, 0);
        let id = pages.keys().next_back().copied().unwrap_or(0) + 1;
        pages.insert(
            id,
            WebPage {
                lang_id: page.lang_id,
                slug,
            },
        );
        Ok(id)
    }

    async fn update(&self, web_page_id: i64, slug: &str) -> Result<bool> {
        let mut pages = self.pages.lock().unwrap();
        let Some(lang_id) = pages.get(&web_page_id).map(|p| p.lang_id) else {
            return Ok(false);
        };
        let slug = Self::free_slug(&pages, slug, lang_id, web_page_id);
        if let Some(page) = pages.get_mut(&web_page_id) {
            page.slug = slug;
        }
        Ok(true)
    }

    async fn delete_by_id(&self, web_page_id: i64) -> Result<bool> {
        Ok(self.pages.lock().unwrap().remove(&web_page_id).is_some())
    }

    fn surround(&self, slug: &str, lang_id: i64) -> String {
        self.urls.build(slug, lang_id)
    }
}

// =============================================================================
// IMAGES
// =============================================================================

#[derive(Default)]
pub struct InMemoryImageStore {
    files: Mutex<BTreeMap<i64, Vec<String>>>,
    fail_deletes: AtomicBool,
    upload_prefix: Mutex<Option<String>>,
}

impl InMemoryImageStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn files(&self, owner_id: i64) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .get(&owner_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Store every following upload under `{prefix}{file_name}`
    pub fn rename_uploads(&self, prefix: &str) {
        *self.upload_prefix.lock().unwrap() = Some(prefix.to_string());
    }

    /// Make every following delete report failure
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn upload(&self, owner_id: i64, file: &CoverUpload) -> Result<String> {
        let stored = match self.upload_prefix.lock().unwrap().as_deref() {
            Some(prefix) => format!("{}{}", prefix, file.file_name),
            None => file.file_name.clone(),
        };

        let mut files = self.files.lock().unwrap();
        let owned = files.entry(owner_id).or_default();
        if !owned.contains(&stored) {
            owned.push(stored.clone());
        }
        Ok(stored)
    }

    async fn delete(&self, owner_id: i64, file_name: Option<&str>) -> Result<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut files = self.files.lock().unwrap();
        match file_name {
            Some(name) => {
                if let Some(owned) = files.get_mut(&owner_id) {
                    owned.retain(|f| f != name);
                }
            }
            None => {
                files.remove(&owner_id);
            }
        }
        Ok(true)
    }

    fn url(&self, owner_id: i64, file_name: &str) -> String {
        format!("https://cdn.test/{}/{}", owner_id, file_name)
    }
}

// =============================================================================
// HISTORY
// =============================================================================

#[derive(Default)]
pub struct RecordingHistory {
    entries: Mutex<Vec<String>>,
}

impl RecordingHistory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryWriter for RecordingHistory {
    async fn write(&self, _module: &str, template: &str, subject: &str) {
        self.entries
            .lock()
            .unwrap()
            .push(render_message(template, subject));
    }
}

// =============================================================================
// STORAGE
// =============================================================================

struct StoredTranslation<T> {
    record: T,
    web_page_id: Option<i64>,
}

struct StoredCategory {
    parent_id: Option<i64>,
    order: i32,
    seo: bool,
    cover: Option<String>,
    translations: BTreeMap<i64, StoredTranslation<CategoryTranslationRecord>>,
}

struct StoredPost {
    category_id: i64,
    timestamp: i64,
    published: bool,
    comments: bool,
    seo: bool,
    views: i64,
    cover: Option<String>,
    translations: BTreeMap<i64, StoredTranslation<PostTranslationRecord>>,
}

#[derive(Default)]
struct StoreState {
    categories: BTreeMap<i64, StoredCategory>,
    posts: BTreeMap<i64, StoredPost>,
    attached: BTreeMap<i64, Vec<i64>>,
    gallery: Vec<PostImage>,
    next_category_id: i64,
    next_post_id: i64,
}

/// Category and post tables in one place, so cascades and counts see both
pub struct InMemoryBlogStore {
    state: Mutex<StoreState>,
    web_pages: Arc<InMemoryWebPages>,
}

impl InMemoryBlogStore {
    pub fn new(web_pages: Arc<InMemoryWebPages>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(StoreState::default()),
            web_pages,
        })
    }

    pub fn post_ids(&self) -> Vec<i64> {
        self.state.lock().unwrap().posts.keys().copied().collect()
    }

    /// Rewire a parent link directly, bypassing service validation
    pub fn set_parent(&self, id: i64, parent_id: Option<i64>) {
        if let Some(category) = self.state.lock().unwrap().categories.get_mut(&id) {
            category.parent_id = parent_id;
        }
    }

    pub fn add_gallery_image(&self, post_id: i64, order: i32, image: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.gallery.len() as i64 + 1;
        state.gallery.push(PostImage {
            id,
            post_id,
            order,
            image: image.to_string(),
        });
        id
    }

    fn slug(&self, web_page_id: Option<i64>) -> String {
        web_page_id
            .and_then(|id| self.web_pages.slug(id))
            .unwrap_or_default()
    }

    fn category(&self, id: i64, row: &StoredCategory, lang_id: i64) -> Option<Category> {
        let t = row.translations.get(&lang_id)?;
        Some(Category {
            id,
            parent_id: row.parent_id,
            lang_id,
            web_page_id: t.web_page_id,
            slug: self.slug(t.web_page_id),
            name: t.record.name.clone(),
            title: t.record.title.clone(),
            description: t.record.description.clone(),
            keywords: t.record.keywords.clone(),
            meta_description: t.record.meta_description.clone(),
            order: row.order,
            seo: row.seo,
            cover: row.cover.clone(),
        })
    }

    /// Categories of one language in (order, id) order
    fn categories_in(&self, state: &StoreState, lang_id: i64) -> Vec<Category> {
        let mut rows: Vec<Category> = state
            .categories
            .iter()
            .filter_map(|(id, row)| self.category(*id, row, lang_id))
            .collect();
        rows.sort_by_key(|c| (c.order, c.id));
        rows
    }

    fn post(&self, state: &StoreState, id: i64, lang_id: i64) -> Option<Post> {
        let row = state.posts.get(&id)?;
        let t = row.translations.get(&lang_id)?;
        let category_name = state
            .categories
            .get(&row.category_id)
            .and_then(|c| c.translations.get(&lang_id))
            .map(|c| c.record.name.clone())
            .unwrap_or_default();

        Some(Post {
            id,
            category_id: row.category_id,
            lang_id,
            web_page_id: t.web_page_id,
            slug: self.slug(t.web_page_id),
            category_name,
            name: t.record.name.clone(),
            title: t.record.title.clone(),
            introduction: t.record.introduction.clone(),
            full: t.record.full.clone(),
            keywords: t.record.keywords.clone(),
            meta_description: t.record.meta_description.clone(),
            timestamp: row.timestamp,
            published: row.published,
            comments: row.comments,
            seo: row.seo,
            views: row.views,
            cover: row.cover.clone(),
        })
    }

    fn posts_in(&self, state: &StoreState, lang_id: i64) -> Vec<Post> {
        state
            .posts
            .keys()
            .filter_map(|id| self.post(state, *id, lang_id))
            .collect()
    }

    fn remove_post(state: &mut StoreState, id: i64) -> bool {
        let removed = state.posts.remove(&id).is_some();
        state.attached.remove(&id);
        for links in state.attached.values_mut() {
            links.retain(|other| *other != id);
        }
        state.gallery.retain(|image| image.post_id != id);
        removed
    }
}

fn upsert<T: Clone>(
    translations: &mut BTreeMap<i64, StoredTranslation<T>>,
    lang_id: i64,
    record: &T,
) {
    translations
        .entry(lang_id)
        .and_modify(|t| t.record = record.clone())
        .or_insert_with(|| StoredTranslation {
            record: record.clone(),
            web_page_id: None,
        });
}

#[async_trait]
impl CategoryRepository for InMemoryBlogStore {
    async fn fetch_all(&self, lang_id: i64) -> Result<Vec<Category>> {
        let state = self.state.lock().unwrap();
        Ok(self.categories_in(&state, lang_id))
    }

    async fn fetch_by_id(&self, id: i64, lang_id: i64) -> Result<Option<Category>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .categories
            .get(&id)
            .and_then(|row| self.category(id, row, lang_id)))
    }

    async fn fetch_translations(&self, id: i64) -> Result<Vec<Category>> {
        let state = self.state.lock().unwrap();
        let Some(row) = state.categories.get(&id) else {
            return Ok(Vec::new());
        };
        Ok(row
            .translations
            .keys()
            .filter_map(|lang_id| self.category(id, row, *lang_id))
            .collect())
    }

    async fn fetch_children_by_parent_id(
        &self,
        parent_id: i64,
        lang_id: i64,
    ) -> Result<Vec<Category>> {
        let state = self.state.lock().unwrap();
        Ok(self
            .categories_in(&state, lang_id)
            .into_iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .collect())
    }

    async fn fetch_bc_data(&self, lang_id: i64) -> Result<Vec<CategoryBcRow>> {
        let state = self.state.lock().unwrap();
        Ok(self
            .categories_in(&state, lang_id)
            .into_iter()
            .map(|c| CategoryBcRow {
                id: c.id,
                parent_id: c.parent_id,
                lang_id: c.lang_id,
                name: c.name,
                slug: c.slug,
            })
            .collect())
    }

    async fn fetch_tree_nodes(&self) -> Result<Vec<CategoryNode>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .categories
            .iter()
            .map(|(id, row)| CategoryNode {
                id: *id,
                parent_id: row.parent_id,
                order: row.order,
            })
            .collect())
    }

    async fn fetch_all_with_post_count(
        &self,
        lang_id: i64,
        published_only: bool,
    ) -> Result<Vec<CategoryWithCount>> {
        let state = self.state.lock().unwrap();
        Ok(self
            .categories_in(&state, lang_id)
            .into_iter()
            .map(|c| {
                let post_count = state
                    .posts
                    .values()
                    .filter(|p| p.category_id == c.id && (p.published || !published_only))
                    .count() as i64;
                CategoryWithCount {
                    id: c.id,
                    lang_id: c.lang_id,
                    name: c.name,
                    slug: c.slug,
                    post_count,
                }
            })
            .collect())
    }

    async fn fetch_web_page_ids(&self, id: i64) -> Result<Vec<i64>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .categories
            .get(&id)
            .map(|row| {
                row.translations
                    .values()
                    .filter_map(|t| t.web_page_id)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        Ok(self.state.lock().unwrap().categories.contains_key(&id))
    }

    async fn insert(&self, record: &CategoryRecord) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        state.next_category_id += 1;
        let id = state.next_category_id;

        let mut translations = BTreeMap::new();
        for t in &record.translations {
            upsert(&mut translations, t.lang_id, t);
        }

        state.categories.insert(
            id,
            StoredCategory {
                parent_id: record.parent_id,
                order: record.order,
                seo: record.seo,
                cover: record.cover.clone(),
                translations,
            },
        );
        Ok(id)
    }

    async fn update(&self, id: i64, record: &CategoryRecord) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(row) = state.categories.get_mut(&id) else {
            return Ok(false);
        };

        row.parent_id = record.parent_id;
        row.order = record.order;
        row.seo = record.seo;
        row.cover = record.cover.clone();
        for t in &record.translations {
            upsert(&mut row.translations, t.lang_id, t);
        }
        Ok(true)
    }

    async fn attach_web_page(&self, id: i64, lang_id: i64, web_page_id: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(t) = state
            .categories
            .get_mut(&id)
            .and_then(|row| row.translations.get_mut(&lang_id))
        {
            t.web_page_id = Some(web_page_id);
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        Ok(self.state.lock().unwrap().categories.remove(&id).is_some())
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn fetch_page(
        &self,
        filter: PostFilter,
        lang_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Post>, i64)> {
        let state = self.state.lock().unwrap();
        let mut posts: Vec<Post> = self
            .posts_in(&state, lang_id)
            .into_iter()
            .filter(|p| !filter.published_only || p.published)
            .filter(|p| filter.category_id.is_none_or(|c| p.category_id == c))
            .collect();

        if filter.published_only {
            posts.sort_by_key(|p| std::cmp::Reverse((p.timestamp, p.id)));
        } else {
            posts.sort_by_key(|p| std::cmp::Reverse(p.id));
        }

        let total = posts.len() as i64;
        let page = posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn fetch_by_id(&self, id: i64, lang_id: i64) -> Result<Option<Post>> {
        let state = self.state.lock().unwrap();
        Ok(self.post(&state, id, lang_id))
    }

    async fn fetch_translations(&self, id: i64) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        let langs: Vec<i64> = state
            .posts
            .get(&id)
            .map(|row| row.translations.keys().copied().collect())
            .unwrap_or_default();
        Ok(langs
            .into_iter()
            .filter_map(|lang_id| self.post(&state, id, lang_id))
            .collect())
    }

    async fn fetch_by_ids(&self, ids: &[i64], lang_id: i64) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        let mut posts: Vec<Post> = ids
            .iter()
            .filter_map(|id| self.post(&state, *id, lang_id))
            .collect();
        posts.sort_by_key(|p| std::cmp::Reverse(p.id));
        Ok(posts)
    }

    async fn fetch_attached_ids(&self, id: i64) -> Result<Vec<i64>> {
        let state = self.state.lock().unwrap();
        let mut ids = state.attached.get(&id).cloned().unwrap_or_default();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn fetch_gallery(&self, post_id: i64) -> Result<Vec<PostImage>> {
        let state = self.state.lock().unwrap();
        let mut images: Vec<PostImage> = state
            .gallery
            .iter()
            .filter(|image| image.post_id == post_id)
            .cloned()
            .collect();
        images.sort_by_key(|image| {
            let newest_first = if image.order == 0 { -image.id } else { 0 };
            (image.order, newest_first, image.id)
        });
        Ok(images)
    }

    async fn fetch_recent(
        &self,
        limit: i64,
        category_id: Option<i64>,
        lang_id: i64,
    ) -> Result<Vec<Post>> {
        let filter = PostFilter {
            published_only: true,
            category_id,
        };
        let (posts, _) = PostRepository::fetch_page(self, filter, lang_id, 0, limit).await?;
        Ok(posts)
    }

    async fn fetch_mostly_viewed(&self, limit: i64, lang_id: i64) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        let mut posts: Vec<Post> = self
            .posts_in(&state, lang_id)
            .into_iter()
            .filter(|p| p.published)
            .collect();
        posts.sort_by_key(|p| std::cmp::Reverse((p.views, p.id)));
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn fetch_random_published(&self, lang_id: i64) -> Result<Option<Post>> {
        let state = self.state.lock().unwrap();
        Ok(self
            .posts_in(&state, lang_id)
            .into_iter()
            .find(|p| p.published))
    }

    async fn fetch_ids_by_category_id(&self, category_id: i64) -> Result<Vec<i64>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .filter(|(_, p)| p.category_id == category_id)
            .map(|(id, _)| *id)
            .collect())
    }

    async fn fetch_web_page_ids(&self, id: i64) -> Result<Vec<i64>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .get(&id)
            .map(|row| {
                row.translations
                    .values()
                    .filter_map(|t| t.web_page_id)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, record: &PostRecord) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        state.next_post_id += 1;
        let id = state.next_post_id;

        let mut translations = BTreeMap::new();
        for t in &record.translations {
            upsert(&mut translations, t.lang_id, t);
        }

        state.posts.insert(
            id,
            StoredPost {
                category_id: record.category_id,
                timestamp: record.timestamp,
                published: record.published,
                comments: record.comments,
                seo: record.seo,
                views: 0,
                cover: record.cover.clone(),
                translations,
            },
        );
        Ok(id)
    }

    async fn update(&self, id: i64, record: &PostRecord) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(row) = state.posts.get_mut(&id) else {
            return Ok(false);
        };

        row.category_id = record.category_id;
        row.timestamp = record.timestamp;
        row.published = record.published;
        row.comments = record.comments;
        row.seo = record.seo;
        row.cover = record.cover.clone();
        for t in &record.translations {
            upsert(&mut row.translations, t.lang_id, t);
        }
        Ok(true)
    }

    async fn attach_web_page(&self, id: i64, lang_id: i64, web_page_id: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(t) = state
            .posts
            .get_mut(&id)
            .and_then(|row| row.translations.get_mut(&lang_id))
        {
            t.web_page_id = Some(web_page_id);
        }
        Ok(())
    }

    async fn replace_attached(&self, id: i64, attached: &[i64]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let links: Vec<i64> = attached
            .iter()
            .copied()
            .filter(|other| state.posts.contains_key(other))
            .collect();
        state.attached.insert(id, links);
        Ok(())
    }

    async fn increment_view_count(&self, id: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        Ok(match state.posts.get_mut(&id) {
            Some(row) => {
                row.views += 1;
                true
            }
            None => false,
        })
    }

    async fn update_flag(&self, id: i64, flag: PostFlag, value: bool) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(row) = state.posts.get_mut(&id) else {
            return Ok(false);
        };
        match flag {
            PostFlag::Published => row.published = value,
            PostFlag::Comments => row.comments = value,
            PostFlag::Seo => row.seo = value,
        }
        Ok(true)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        Ok(Self::remove_post(&mut state, id))
    }

    async fn delete_by_category_id(&self, category_id: i64) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let ids: Vec<i64> = state
            .posts
            .iter()
            .filter(|(_, p)| p.category_id == category_id)
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            Self::remove_post(&mut state, *id);
        }
        Ok(ids.len() as u64)
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

pub fn test_config() -> Arc<BlogConfig> {
    Arc::new(BlogConfig {
        default_lang_id: 1,
        per_page: 10,
        site_url: TEST_SITE_URL.to_string(),
        recent_limit: 5,
    })
}

/// Category form in language 1 with generated SEO text
pub fn category_input(name: &str, parent_id: Option<i64>) -> CategoryInputDto {
    CategoryInputDto {
        parent_id,
        order: 0,
        seo: true,
        remove_cover: false,
        cover: None,
        translations: vec![CategoryTranslationDto {
            lang_id: 1,
            name: name.to_string(),
            title: String::new(),
            slug: String::new(),
            description: Sentence(3..8).fake(),
            keywords: Words(2..4).fake::<Vec<String>>().join(", "),
            meta_description: Sentence(3..6).fake(),
        }],
    }
}

/// Published post form in language 1 with generated body text
pub fn post_input(name: &str, category_id: i64, date: &str) -> PostInputDto {
    PostInputDto {
        category_id,
        date: date.to_string(),
        published: true,
        comments: true,
        seo: true,
        remove_cover: false,
        cover: None,
        attached_ids: None,
        translations: vec![PostTranslationDto {
            lang_id: 1,
            name: name.to_string(),
            title: String::new(),
            slug: String::new(),
            introduction: Sentence(5..10).fake(),
            full: Sentence(10..20).fake(),
            keywords: Words(2..4).fake::<Vec<String>>().join(", "),
            meta_description: Sentence(3..6).fake(),
        }],
    }
}

pub fn cover_upload(file_name: &str) -> CoverUploadDto {
    CoverUploadDto {
        file_name: file_name.to_string(),
        content_type: "image/png".to_string(),
        data: BASE64.encode(file_name.as_bytes()),
    }
}

/// Services wired to in-memory collaborators
pub struct TestBlog {
    pub store: Arc<InMemoryBlogStore>,
    pub web_pages: Arc<InMemoryWebPages>,
    pub category_images: Arc<InMemoryImageStore>,
    pub post_images: Arc<InMemoryImageStore>,
    pub history: Arc<RecordingHistory>,
    pub categories: Arc<CategoryService>,
    pub posts: Arc<PostService>,
    pub site: Arc<SiteService>,
}

impl TestBlog {
    pub fn new() -> Self {
        let web_pages = InMemoryWebPages::new();
        let store = InMemoryBlogStore::new(web_pages.clone());
        let category_images = InMemoryImageStore::new();
        let post_images = InMemoryImageStore::new();
        let history = RecordingHistory::new();

        let categories = Arc::new(
            CategoryService::new(
                store.clone(),
                store.clone(),
                web_pages.clone(),
                category_images.clone(),
                post_images.clone(),
            )
            .with_history(history.clone()),
        );
        let posts = Arc::new(
            PostService::new(
                store.clone(),
                categories.clone(),
                web_pages.clone(),
                post_images.clone(),
            )
            .with_history(history.clone()),
        );
        let site = Arc::new(SiteService::new(
            store.clone(),
            categories.clone(),
            web_pages.clone(),
        ));

        Self {
            store,
            web_pages,
            category_images,
            post_images,
            history,
            categories,
            posts,
            site,
        }
    }

    /// Every blog route, with the configuration extension `main` installs
    pub fn router(&self) -> Router {
        let state = SiteState {
            site: self.site.clone(),
            categories: self.categories.clone(),
            posts: self.posts.clone(),
            config: test_config(),
        };

        crate::features::router(self.categories.clone(), self.posts.clone(), state)
            .layer(Extension(test_config()))
    }
}
