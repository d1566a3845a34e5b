use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    BreadcrumbDto, CategoryInputDto, CategoryOptionDto, CategoryResponseDto, CategoryTreeDto,
};
use crate::features::categories::models::{
    Category, CategoryRecord, CategoryTranslationRecord, CategoryWithCount,
};
use crate::features::categories::repositories::CategoryRepository;
use crate::features::posts::repositories::PostRepository;
use crate::modules::history::HistoryWriter;
use crate::modules::storage::{CoverUpload, ImageStore};
use crate::modules::web_pages::{NewWebPage, WebPageRegistry};
use crate::shared::constants::{CATEGORY_PAGE_LABEL, CATEGORY_PAGE_ROUTE, MODULE_NAME};
use crate::shared::tree::{build_breadcrumbs, TreeBuilder};
use crate::shared::validation::slugify;

/// Service for category operations
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    posts: Arc<dyn PostRepository>,
    web_pages: Arc<dyn WebPageRegistry>,
    images: Arc<dyn ImageStore>,
    post_images: Arc<dyn ImageStore>,
    history: Option<Arc<dyn HistoryWriter>>,
}

impl CategoryService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        posts: Arc<dyn PostRepository>,
        web_pages: Arc<dyn WebPageRegistry>,
        images: Arc<dyn ImageStore>,
        post_images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            categories,
            posts,
            web_pages,
            images,
            post_images,
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

    pub async fn fetch_all(&self, lang_id: i64) -> Result<Vec<Category>> {
        self.categories.fetch_all(lang_id).await
    }

    /// `None` when the category has no row in this language
    pub async fn fetch_by_id(&self, id: i64, lang_id: i64) -> Result<Option<Category>> {
        self.categories.fetch_by_id(id, lang_id).await
    }

    pub async fn fetch_translations(&self, id: i64) -> Result<Vec<Category>> {
        self.categories.fetch_translations(id).await
    }

    pub async fn fetch_children_by_parent_id(
        &self,
        parent_id: i64,
        lang_id: i64,
    ) -> Result<Vec<Category>> {
        self.categories
            .fetch_children_by_parent_id(parent_id, lang_id)
            .await
    }

    pub async fn fetch_all_with_count(
        &self,
        lang_id: i64,
        published_only: bool,
    ) -> Result<Vec<CategoryWithCount>> {
        self.categories
            .fetch_all_with_post_count(lang_id, published_only)
            .await
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        self.categories.exists(id).await
    }

    /// Nested categories for navigation
    pub async fn get_tree(&self, lang_id: i64) -> Result<Vec<CategoryTreeDto>> {
        let rows = self.categories.fetch_all(lang_id).await?;

        let tree = TreeBuilder::new(&rows).build(|category, children| CategoryTreeDto {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            url: self.web_pages.surround(&category.slug, category.lang_id),
            order: category.order,
            children,
        })?;

        Ok(tree)
    }

    /// Indented list for a parent/category dropdown
    pub async fn get_options(&self, lang_id: i64) -> Result<Vec<CategoryOptionDto>> {
        let rows = self.categories.fetch_all(lang_id).await?;

        let options = TreeBuilder::new(&rows)
            .flatten(|category| category.name.clone())?
            .into_iter()
            .map(|(id, label)| CategoryOptionDto {
                id: Some(id),
                label,
            })
            .collect();

        Ok(options)
    }

    /// Same as [`get_options`](Self::get_options) with a leading prompt entry
    pub async fn get_prompt_options(
        &self,
        lang_id: i64,
        prompt: &str,
    ) -> Result<Vec<CategoryOptionDto>> {
        let mut options = vec![CategoryOptionDto {
            id: None,
            label: prompt.to_string(),
        }];
        options.extend(self.get_options(lang_id).await?);
        Ok(options)
    }

    /// Root-first trail ending with the category itself
    pub async fn get_breadcrumbs(&self, category_id: i64, lang_id: i64) -> Result<Vec<BreadcrumbDto>> {
        let rows = self.categories.fetch_bc_data(lang_id).await?;

        let breadcrumbs = build_breadcrumbs(&rows, category_id, |row| BreadcrumbDto {
            name: row.name.clone(),
            link: Some(self.web_pages.surround(&row.slug, row.lang_id)),
        })?;

        Ok(breadcrumbs)
    }

    pub fn to_response(&self, category: Category) -> CategoryResponseDto {
        let url = self.web_pages.surround(&category.slug, category.lang_id);
        let cover_url = category
            .cover
            .as_deref()
            .map(|cover| self.images.url(category.id, cover));

        CategoryResponseDto {
            id: category.id,
            parent_id: category.parent_id,
            lang_id: category.lang_id,
            web_page_id: category.web_page_id,
            name: category.name,
            title: category.title,
            slug: category.slug,
            url,
            description: category.description,
            keywords: category.keywords,
            meta_description: category.meta_description,
            order: category.order,
            seo: category.seo,
            cover: category.cover,
            cover_url,
        }
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Create a category with all its translations and return the new id
    pub async fn add(&self, dto: CategoryInputDto) -> Result<i64> {
        let (mut record, cover) = prepare_input(&dto)?;

        if let Some(parent_id) = record.parent_id {
            if !self.categories.exists(parent_id).await? {
                return Err(AppError::NotFound(format!(
                    "Parent category {} not found",
                    parent_id
                )));
            }
        }

        let id = self.categories.insert(&record).await?;

        if let Some(cover) = &cover {
            record.cover = Some(self.images.upload(id, cover).await?);
            self.categories.update(id, &record).await?;
        }

        for translation in &record.translations {
            let web_page_id = self.register_page(id, translation).await?;
            self.categories
                .attach_web_page(id, translation.lang_id, web_page_id)
                .await?;
        }

        let name = display_name(&record);
        self.track("Category \"%s\" has been created", name).await;
        info!("Category created: id={}, name={}", id, name);

        Ok(id)
    }

    /// Update a category. `Ok(false)` when the old cover could not be removed,
    /// in which case nothing is persisted.
    pub async fn update(&self, id: i64, dto: CategoryInputDto) -> Result<bool> {
        let existing = self.categories.fetch_translations(id).await?;
        let Some(current) = existing.first() else {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        };

        let (mut record, cover) = prepare_input(&dto)?;

        if let Some(parent_id) = record.parent_id {
            self.ensure_valid_parent(id, parent_id).await?;
        }

        record.cover = current.cover.clone();
        if dto.remove_cover {
            if !self.images.delete(id, None).await? {
                warn!("Could not remove covers of category {}", id);
            }
            record.cover = None;
        } else if let Some(cover) = &cover {
            if let Some(old) = current.cover.as_deref() {
                if !self.images.delete(id, Some(old)).await? {
                    warn!("Category {} update aborted: old cover '{}' not removed", id, old);
                    return Ok(false);
                }
            }
            record.cover = Some(self.images.upload(id, cover).await?);
        }

        if !self.categories.update(id, &record).await? {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        for translation in &record.translations {
            let page = existing
                .iter()
                .find(|c| c.lang_id == translation.lang_id)
                .and_then(|c| c.web_page_id);

            match page {
                Some(web_page_id) => {
                    self.web_pages.update(web_page_id, &translation.slug).await?;
                }
                None => {
                    let web_page_id = self.register_page(id, translation).await?;
                    self.categories
                        .attach_web_page(id, translation.lang_id, web_page_id)
                        .await?;
                }
            }
        }

        let name = display_name(&record);
        self.track("Category \"%s\" has been updated", name).await;
        info!("Category updated: id={}, name={}", id, name);

        Ok(true)
    }

    /// Delete a category, its descendants and every post filed under them.
    /// `Ok(false)` when the category does not exist.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let translations = self.categories.fetch_translations(id).await?;
        let Some(name) = translations.first().map(|c| c.name.clone()) else {
            return Ok(false);
        };

        let nodes = self.categories.fetch_tree_nodes().await?;
        let descendants = TreeBuilder::new(&nodes).find_child_node_ids(id)?;

        // Preorder reversed: children always go before their parent
        for child_id in descendants.iter().rev() {
            self.remove_all_by_id(*child_id).await?;
        }

        let removed = self.remove_all_by_id(id).await?;

        if removed {
            self.track("Category \"%s\" has been removed", &name).await;
            info!(
                "Category deleted: id={}, descendants={}",
                id,
                descendants.len()
            );
        }

        Ok(removed)
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    async fn ensure_valid_parent(&self, id: i64, parent_id: i64) -> Result<()> {
        if parent_id == id {
            return Err(AppError::CycleDetected(id));
        }

        if !self.categories.exists(parent_id).await? {
            return Err(AppError::NotFound(format!(
                "Parent category {} not found",
                parent_id
            )));
        }

        let nodes = self.categories.fetch_tree_nodes().await?;
        let descendants = TreeBuilder::new(&nodes).find_child_node_ids(id)?;
        if descendants.contains(&parent_id) {
            return Err(AppError::CycleDetected(id));
        }

        Ok(())
    }

    /// Removes one category with its posts, pages and images
    async fn remove_all_by_id(&self, id: i64) -> Result<bool> {
        for post_id in self.posts.fetch_ids_by_category_id(id).await? {
            for web_page_id in self.posts.fetch_web_page_ids(post_id).await? {
                self.web_pages.delete_by_id(web_page_id).await?;
            }
            if !self.post_images.delete(post_id, None).await? {
                warn!("Could not remove images of post {}", post_id);
            }
        }
        self.posts.delete_by_category_id(id).await?;

        for web_page_id in self.categories.fetch_web_page_ids(id).await? {
            self.web_pages.delete_by_id(web_page_id).await?;
        }
        if !self.images.delete(id, None).await? {
            warn!("Could not remove covers of category {}", id);
        }

        self.categories.delete_by_id(id).await
    }

    async fn register_page(&self, id: i64, translation: &CategoryTranslationRecord) -> Result<i64> {
        self.web_pages
            .add(NewWebPage {
                target_id: id,
                lang_id: translation.lang_id,
                slug: &translation.slug,
                module: CATEGORY_PAGE_LABEL,
                controller: CATEGORY_PAGE_ROUTE,
            })
            .await
    }

    async fn track(&self, template: &str, subject: &str) {
        if let Some(history) = &self.history {
            history.write(MODULE_NAME, template, subject).await;
        }
    }
}

/// Normalizes the form: zero parent means root, blank title and slug fall
/// back to the name, one translation per language
fn prepare_input(dto: &CategoryInputDto) -> Result<(CategoryRecord, Option<CoverUpload>)> {
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
            return Err(AppError::Validation("Category name is required".to_string()));
        }

        let title = match t.title.trim() {
            "" => name,
            title => title,
        };
        let slug = match t.slug.trim() {
            "" => slugify(name),
            slug => slugify(slug),
        };

        translations.push(CategoryTranslationRecord {
            lang_id: t.lang_id,
            slug,
            name: name.to_string(),
            title: title.to_string(),
            description: t.description.clone(),
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

    let record = CategoryRecord {
        parent_id: dto.parent_id.filter(|&id| id > 0),
        order: dto.order,
        seo: dto.seo,
        cover: None,
        translations,
    };

    Ok((record, cover))
}

fn display_name(record: &CategoryRecord) -> &str {
    record
        .translations
        .first()
        .map(|t| t.name.as_str())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{category_input, cover_upload, post_input, TestBlog};

    #[tokio::test]
    async fn test_add_normalizes_and_registers_pages() {
        let blog = TestBlog::new();

        let id = blog
            .categories
            .add(category_input("Machine Learning", None))
            .await
            .unwrap();

        let category = blog.categories.fetch_by_id(id, 1).await.unwrap().unwrap();
        assert_eq!(category.name, "Machine Learning");
        assert_eq!(category.title, "Machine Learning");
        assert_eq!(category.slug, "machine-learning");
        assert_eq!(category.parent_id, None);
        assert!(category.web_page_id.is_some());
        assert_eq!(blog.web_pages.len(), 1);
        assert_eq!(
            blog.history.entries(),
            vec!["Category \"Machine Learning\" has been created".to_string()]
        );
    }

    #[tokio::test]
    async fn test_add_zero_parent_is_root() {
        let blog = TestBlog::new();

        let id = blog
            .categories
            .add(category_input("News", Some(0)))
            .await
            .unwrap();

        let category = blog.categories.fetch_by_id(id, 1).await.unwrap().unwrap();
        assert_eq!(category.parent_id, None);
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_parent() {
        let blog = TestBlog::new();

        let result = blog.categories.add(category_input("Orphan", Some(42))).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(blog.categories.fetch_all(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_with_cover_stores_image() {
        let blog = TestBlog::new();
        let mut input = category_input("Photos", None);
        input.cover = Some(cover_upload("sunset.jpg"));

        let id = blog.categories.add(input).await.unwrap();

        let category = blog.categories.fetch_by_id(id, 1).await.unwrap().unwrap();
        assert_eq!(category.cover.as_deref(), Some("sunset.jpg"));
        assert_eq!(blog.category_images.files(id), vec!["sunset.jpg".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_by_id_missing_is_none() {
        let blog = TestBlog::new();
        assert!(blog.categories.fetch_by_id(99, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tree_options_and_breadcrumbs() {
        let blog = TestBlog::new();
        let tech = blog.categories.add(category_input("Tech", None)).await.unwrap();
        let ai = blog
            .categories
            .add(category_input("AI", Some(tech)))
            .await
            .unwrap();
        let llms = blog
            .categories
            .add(category_input("LLMs", Some(ai)))
            .await
            .unwrap();

        let tree = blog.categories.get_tree(1).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "Tech");
        assert_eq!(tree[0].url, "https://blog.test/tech");
        assert_eq!(tree[0].children[0].name, "AI");
        assert_eq!(tree[0].children[0].children[0].id, llms);

        let options = blog.categories.get_prompt_options(1, "No parent").await.unwrap();
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["No parent", "Tech", "— AI", "— — LLMs"]);
        assert_eq!(options[0].id, None);

        let crumbs = blog.categories.get_breadcrumbs(llms, 1).await.unwrap();
        let names: Vec<&str> = crumbs.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Tech", "AI", "LLMs"]);
        assert_eq!(crumbs[1].link.as_deref(), Some("https://blog.test/ai"));

        assert!(blog.categories.get_breadcrumbs(404, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_children_by_parent_id() {
        let blog = TestBlog::new();
        let tech = blog.categories.add(category_input("Tech", None)).await.unwrap();
        blog.categories.add(category_input("AI", Some(tech))).await.unwrap();
        blog.categories.add(category_input("Web", Some(tech))).await.unwrap();
        blog.categories.add(category_input("Life", None)).await.unwrap();

        let children = blog.categories.fetch_children_by_parent_id(tech, 1).await.unwrap();
        let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["AI", "Web"]);
    }

    #[tokio::test]
    async fn test_update_rejects_cycles() {
        let blog = TestBlog::new();
        let tech = blog.categories.add(category_input("Tech", None)).await.unwrap();
        let ai = blog
            .categories
            .add(category_input("AI", Some(tech)))
            .await
            .unwrap();

        let to_self = blog.categories.update(tech, category_input("Tech", Some(tech))).await;
        assert!(matches!(to_self, Err(AppError::CycleDetected(_))));

        let to_child = blog.categories.update(tech, category_input("Tech", Some(ai))).await;
        assert!(matches!(to_child, Err(AppError::CycleDetected(_))));

        let dangling = blog.categories.update(ai, category_input("AI", Some(999))).await;
        assert!(matches!(dangling, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_renames_and_moves() {
        let blog = TestBlog::new();
        let tech = blog.categories.add(category_input("Tech", None)).await.unwrap();
        let life = blog.categories.add(category_input("Life", None)).await.unwrap();

        let updated = blog
            .categories
            .update(life, category_input("Lifestyle", Some(tech)))
            .await
            .unwrap();
        assert!(updated);

        let category = blog.categories.fetch_by_id(life, 1).await.unwrap().unwrap();
        assert_eq!(category.name, "Lifestyle");
        assert_eq!(category.slug, "lifestyle");
        assert_eq!(category.parent_id, Some(tech));
        assert_eq!(blog.web_pages.len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_category() {
        let blog = TestBlog::new();
        let result = blog.categories.update(7, category_input("Ghost", None)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_cover_replace_and_abort() {
        let blog = TestBlog::new();
        let mut input = category_input("Photos", None);
        input.cover = Some(cover_upload("old.jpg"));
        let id = blog.categories.add(input).await.unwrap();

        let mut replace = category_input("Photos", None);
        replace.cover = Some(cover_upload("new.jpg"));
        assert!(blog.categories.update(id, replace.clone()).await.unwrap());
        assert_eq!(blog.category_images.files(id), vec!["new.jpg".to_string()]);

        blog.category_images.fail_deletes(true);
        let mut again = replace;
        again.cover = Some(cover_upload("newer.jpg"));
        again.translations[0].name = "Renamed".to_string();
        assert!(!blog.categories.update(id, again).await.unwrap());

        let category = blog.categories.fetch_by_id(id, 1).await.unwrap().unwrap();
        assert_eq!(category.name, "Photos");
        assert_eq!(category.cover.as_deref(), Some("new.jpg"));
    }

    #[tokio::test]
    async fn test_update_remove_cover() {
        let blog = TestBlog::new();
        let mut input = category_input("Photos", None);
        input.cover = Some(cover_upload("old.jpg"));
        let id = blog.categories.add(input).await.unwrap();

        let mut remove = category_input("Photos", None);
        remove.remove_cover = true;
        assert!(blog.categories.update(id, remove).await.unwrap());

        let category = blog.categories.fetch_by_id(id, 1).await.unwrap().unwrap();
        assert_eq!(category.cover, None);
        assert!(blog.category_images.files(id).is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_descendants_and_posts() {
        let blog = TestBlog::new();
        let tech = blog.categories.add(category_input("Tech", None)).await.unwrap();
        let ai = blog
            .categories
            .add(category_input("AI", Some(tech)))
            .await
            .unwrap();
        let llms = blog
            .categories
            .add(category_input("LLMs", Some(ai)))
            .await
            .unwrap();
        let life = blog.categories.add(category_input("Life", None)).await.unwrap();

        let mut with_cover = post_input("Transformers", llms, "01/15/2024");
        with_cover.cover = Some(cover_upload("diagram.png"));
        let in_llms = blog.posts.add(with_cover).await.unwrap();
        blog.posts
            .add(post_input("Intro", tech, "01/10/2024"))
            .await
            .unwrap();
        let kept = blog
            .posts
            .add(post_input("Gardening", life, "01/12/2024"))
            .await
            .unwrap();

        assert!(blog.categories.delete_by_id(tech).await.unwrap());

        let remaining: Vec<i64> = blog
            .categories
            .fetch_all(1)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(remaining, vec![life]);
        assert_eq!(blog.store.post_ids(), vec![kept]);
        assert!(blog.post_images.files(in_llms).is_empty());
        // Only the remaining category and post keep their pages
        assert_eq!(blog.web_pages.len(), 2);
        assert_eq!(
            blog.history.entries().last().map(String::as_str),
            Some("Category \"Tech\" has been removed")
        );
    }

    #[tokio::test]
    async fn test_delete_missing_category() {
        let blog = TestBlog::new();
        assert!(!blog.categories.delete_by_id(5).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_keeps_stored_cover_name() {
        let blog = TestBlog::new();
        blog.category_images.rename_uploads("v2-");
        let mut input = category_input("Photos", None);
        input.cover = Some(cover_upload("sunset.jpg"));

        let id = blog.categories.add(input).await.unwrap();

        let category = blog.categories.fetch_by_id(id, 1).await.unwrap().unwrap();
        assert_eq!(category.cover.as_deref(), Some("v2-sunset.jpg"));
        assert_eq!(blog.category_images.files(id), vec!["v2-sunset.jpg".to_string()]);
        assert!(category.web_page_id.is_some());
    }

    #[tokio::test]
    async fn test_stored_parent_loop_reports_cycle() {
        let blog = TestBlog::new();
        let tech = blog.categories.add(category_input("Tech", None)).await.unwrap();
        let ai = blog
            .categories
            .add(category_input("AI", Some(tech)))
            .await
            .unwrap();
        blog.store.set_parent(tech, Some(ai));

        assert!(matches!(
            blog.categories.get_tree(1).await,
            Err(AppError::CycleDetected(_))
        ));
        assert!(matches!(
            blog.categories.get_options(1).await,
            Err(AppError::CycleDetected(_))
        ));
        assert!(matches!(
            blog.categories.get_breadcrumbs(ai, 1).await,
            Err(AppError::CycleDetected(_))
        ));
        assert!(matches!(
            blog.categories.delete_by_id(tech).await,
            Err(AppError::CycleDetected(_))
        ));

        // Nothing is removed when the walk fails
        assert!(blog.categories.exists(tech).await.unwrap());
        assert!(blog.categories.exists(ai).await.unwrap());
        assert_eq!(blog.web_pages.len(), 2);
    }

    #[tokio::test]
    async fn test_non_ascii_name_gets_page_slug() {
        let blog = TestBlog::new();
        let id = blog.categories.add(category_input("Новости", None)).await.unwrap();

        let category = blog.categories.fetch_by_id(id, 1).await.unwrap().unwrap();
        assert_eq!(category.slug, format!("page-{}", id));
    }
}
