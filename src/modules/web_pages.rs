//! Web page registry: maps human-readable slugs to blog content for public
//! routing and builds the public URLs the services hand out.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::core::error::{AppError, Result};
use crate::shared::validation::SLUG_REGEX;

/// Registration request for a new public page
#[derive(Debug, Clone, Copy)]
pub struct NewWebPage<'a> {
    pub target_id: i64,
    pub lang_id: i64,
    pub slug: &'a str,
    /// Human label of the owning module, e.g. "Blog (Posts)"
    pub module: &'a str,
    /// Route reference that serves the page
    pub controller: &'a str,
}

#[async_trait]
pub trait WebPageRegistry: Send + Sync {
    /// Register a page and return its id. The stored slug may get a numeric
    /// suffix when the requested one is taken.
    async fn add(&self, page: NewWebPage<'_>) -> Result<i64>;

    async fn update(&self, web_page_id: i64, slug: &str) -> Result<bool>;

    async fn delete_by_id(&self, web_page_id: i64) -> Result<bool>;

    /// Public URL of `slug` in language `lang_id`
    fn surround(&self, slug: &str, lang_id: i64) -> String;
}

/// Requested slug, or `page-{target_id}` when it is not a usable slug
pub fn base_slug(slug: &str, target_id: i64) -> String {
    if SLUG_REGEX.is_match(slug) {
        slug.to_string()
    } else {
        format!("page-{}", target_id)
    }
}

/// First of `base`, `base-2`, `base-3`, ... that is not in `taken`
pub fn unique_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Builds `{site}/{slug}` for the default language and `{site}/{code}/{slug}`
/// for the others
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    site_url: String,
    default_lang_id: i64,
    language_codes: HashMap<i64, String>,
}

impl UrlBuilder {
    pub fn new(
        site_url: impl Into<String>,
        default_lang_id: i64,
        language_codes: HashMap<i64, String>,
    ) -> Self {
        Self {
            site_url: site_url.into(),
            default_lang_id,
            language_codes,
        }
    }

    pub fn build(&self, slug: &str, lang_id: i64) -> String {
        let slug = urlencoding::encode(slug);
        match self.language_codes.get(&lang_id) {
            Some(code) if lang_id != self.default_lang_id => {
                format!("{}/{}/{}", self.site_url, code, slug)
            }
            _ => format!("{}/{}", self.site_url, slug),
        }
    }
}

/// PostgreSQL-backed registry over the `web_pages` table
pub struct PgWebPageRegistry {
    pool: PgPool,
    urls: UrlBuilder,
}

impl PgWebPageRegistry {
    /// Loads language codes once so `surround` stays synchronous
    pub async fn new(pool: PgPool, site_url: &str, default_lang_id: i64) -> Result<Self> {
        let languages: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, code FROM languages ORDER BY id")
                .fetch_all(&pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to load languages: {:?}", e);
                    AppError::Database(e)
                })?;

        info!("Web page registry loaded {} language(s)", languages.len());

        Ok(Self {
            pool,
            urls: UrlBuilder::new(site_url, default_lang_id, languages.into_iter().collect()),
        })
    }

    async fn free_slug(&self, slug: &str, lang_id: i64, exclude_id: Option<i64>) -> Result<String> {
        let taken: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT slug FROM web_pages
            WHERE lang_id = $1
              AND (slug = $2 OR slug LIKE $2 || '-%')
              AND ($3::BIGINT IS NULL OR id <> $3)
            "#,
        )
        .bind(lang_id)
        .bind(slug)
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await?;

        let taken: HashSet<String> = taken.into_iter().map(|(s,)| s).collect();
        Ok(unique_slug(slug, &taken))
    }
}

#[async_trait]
impl WebPageRegistry for PgWebPageRegistry {
    async fn add(&self, page: NewWebPage<'_>) -> Result<i64> {
        let base = base_slug(page.slug, page.target_id);
        let slug = self.free_slug(&base, page.lang_id, None).await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO web_pages (lang_id, slug, target_id, module, controller)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(page.lang_id)
        .bind(&slug)
        .bind(page.target_id)
        .bind(page.module)
        .bind(page.controller)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to register web page: {:?}", e);
            AppError::Database(e)
        })?;

        debug!("Web page registered: id={}, slug={}", id, slug);
        Ok(id)
    }

    async fn update(&self, web_page_id: i64, slug: &str) -> Result<bool> {
        let lang: Option<(i64, i64)> =
            sqlx::query_as("SELECT lang_id, target_id FROM web_pages WHERE id = $1")
                .bind(web_page_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some((lang_id, target_id)) = lang else {
            return Ok(false);
        };

        let base = base_slug(slug, target_id);
        let slug = self.free_slug(&base, lang_id, Some(web_page_id)).await?;

        let result = sqlx::query("UPDATE web_pages SET slug = $1 WHERE id = $2")
            .bind(&slug)
            .bind(web_page_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, web_page_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM web_pages WHERE id = $1")
            .bind(web_page_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn surround(&self, slug: &str, lang_id: i64) -> String {
        self.urls.build(slug, lang_id)
    }
}
