use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::core::error::{AppError, Result};
use crate::features::posts::models::{Post, PostFilter, PostFlag, PostImage, PostRecord};

/// Persistence of posts, their translations, related posts and galleries
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// One page of a listing and the total row count of the filter
    async fn fetch_page(
        &self,
        filter: PostFilter,
        lang_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Post>, i64)>;

    async fn fetch_by_id(&self, id: i64, lang_id: i64) -> Result<Option<Post>>;

    /// Every language of one post
    async fn fetch_translations(&self, id: i64) -> Result<Vec<Post>>;

    async fn fetch_by_ids(&self, ids: &[i64], lang_id: i64) -> Result<Vec<Post>>;

    async fn fetch_attached_ids(&self, id: i64) -> Result<Vec<i64>>;

    async fn fetch_gallery(&self, post_id: i64) -> Result<Vec<PostImage>>;

    /// Newest published posts, optionally within one category
    async fn fetch_recent(
        &self,
        limit: i64,
        category_id: Option<i64>,
        lang_id: i64,
    ) -> Result<Vec<Post>>;

    async fn fetch_mostly_viewed(&self, limit: i64, lang_id: i64) -> Result<Vec<Post>>;

    async fn fetch_random_published(&self, lang_id: i64) -> Result<Option<Post>>;

    async fn fetch_ids_by_category_id(&self, category_id: i64) -> Result<Vec<i64>>;

    async fn fetch_web_page_ids(&self, id: i64) -> Result<Vec<i64>>;

    /// Insert the post (views = 0) and all translations, returning the new id
    async fn insert(&self, record: &PostRecord) -> Result<i64>;

    /// Overwrite the shared row and upsert the given translations
    async fn update(&self, id: i64, record: &PostRecord) -> Result<bool>;

    async fn attach_web_page(&self, id: i64, lang_id: i64, web_page_id: i64) -> Result<()>;

    /// Make `attached` the complete set of related posts of `id`
    async fn replace_attached(&self, id: i64, attached: &[i64]) -> Result<()>;

    async fn increment_view_count(&self, id: i64) -> Result<bool>;

    async fn update_flag(&self, id: i64, flag: PostFlag, value: bool) -> Result<bool>;

    async fn delete_by_id(&self, id: i64) -> Result<bool>;

    async fn delete_by_category_id(&self, category_id: i64) -> Result<u64>;
}

const SELECT_POST: &str = r#"
    SELECT p.id, p.category_id, t.lang_id, t.web_page_id, COALESCE(w.slug, '') AS slug,
           COALESCE(ct.name, '') AS category_name,
           t.name, t.title, t.introduction, t."full", t.keywords, t.meta_description,
           p."timestamp", p.published, p.comments, p.seo, p.views, p.cover
    FROM blog_posts p
    JOIN blog_posts_translations t ON t.id = p.id
    LEFT JOIN web_pages w ON w.id = t.web_page_id
    LEFT JOIN blog_categories_translations ct
        ON ct.id = p.category_id AND ct.lang_id = t.lang_id
"#;

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert_translations(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        record: &PostRecord,
    ) -> Result<()> {
        for t in &record.translations {
            sqlx::query(
                r#"
                INSERT INTO blog_posts_translations
                    (id, lang_id, name, title, introduction, "full", keywords, meta_description)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id, lang_id) DO UPDATE SET
                    name = EXCLUDED.name,
                    title = EXCLUDED.title,
                    introduction = EXCLUDED.introduction,
                    "full" = EXCLUDED."full",
                    keywords = EXCLUDED.keywords,
                    meta_description = EXCLUDED.meta_description
                "#,
            )
            .bind(id)
            .bind(t.lang_id)
            .bind(&t.name)
            .bind(&t.title)
            .bind(&t.introduction)
            .bind(&t.full)
            .bind(&t.keywords)
            .bind(&t.meta_description)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn fetch_page(
        &self,
        filter: PostFilter,
        lang_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Post>, i64)> {
        let order_by = if filter.published_only {
            r#"p."timestamp" DESC, p.id DESC"#
        } else {
            "p.id DESC"
        };

        let sql = format!(
            r#"
            {}
            WHERE t.lang_id = $1
              AND (NOT $2 OR p.published)
              AND ($3::BIGINT IS NULL OR p.category_id = $3)
            ORDER BY {}
            LIMIT $4 OFFSET $5
            "#,
            SELECT_POST, order_by
        );

        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(lang_id)
            .bind(filter.published_only)
            .bind(filter.category_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list posts: {:?}", e);
                AppError::Database(e)
            })?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM blog_posts p
            JOIN blog_posts_translations t ON t.id = p.id
            WHERE t.lang_id = $1
              AND (NOT $2 OR p.published)
              AND ($3::BIGINT IS NULL OR p.category_id = $3)
            "#,
        )
        .bind(lang_id)
        .bind(filter.published_only)
        .bind(filter.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((posts, total))
    }

    async fn fetch_by_id(&self, id: i64, lang_id: i64) -> Result<Option<Post>> {
        let sql = format!("{} WHERE p.id = $1 AND t.lang_id = $2", SELECT_POST);
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(lang_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get post {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn fetch_translations(&self, id: i64) -> Result<Vec<Post>> {
        let sql = format!("{} WHERE p.id = $1 ORDER BY t.lang_id", SELECT_POST);
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn fetch_by_ids(&self, ids: &[i64], lang_id: i64) -> Result<Vec<Post>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{} WHERE p.id = ANY($1) AND t.lang_id = $2 ORDER BY p.id DESC",
            SELECT_POST
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(ids)
            .bind(lang_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn fetch_attached_ids(&self, id: i64) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT slave_id FROM blog_posts_attached WHERE master_id = $1 ORDER BY slave_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn fetch_gallery(&self, post_id: i64) -> Result<Vec<PostImage>> {
        Ok(sqlx::query_as::<_, PostImage>(
            r#"
            SELECT id, post_id, "order", image
            FROM blog_posts_gallery
            WHERE post_id = $1
            ORDER BY "order", CASE WHEN "order" = 0 THEN id END DESC, id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_recent(
        &self,
        limit: i64,
        category_id: Option<i64>,
        lang_id: i64,
    ) -> Result<Vec<Post>> {
        let sql = format!(
            r#"
            {}
            WHERE t.lang_id = $1 AND p.published
              AND ($2::BIGINT IS NULL OR p.category_id = $2)
            ORDER BY p."timestamp" DESC, p.id DESC
            LIMIT $3
            "#,
            SELECT_POST
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(lang_id)
            .bind(category_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn fetch_mostly_viewed(&self, limit: i64, lang_id: i64) -> Result<Vec<Post>> {
        let sql = format!(
            r#"
            {}
            WHERE t.lang_id = $1 AND p.published
            ORDER BY p.views DESC, p.id DESC
            LIMIT $2
            "#,
            SELECT_POST
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(lang_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn fetch_random_published(&self, lang_id: i64) -> Result<Option<Post>> {
        let sql = format!(
            "{} WHERE t.lang_id = $1 AND p.published ORDER BY random() LIMIT 1",
            SELECT_POST
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(lang_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn fetch_ids_by_category_id(&self, category_id: i64) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM blog_posts WHERE category_id = $1 ORDER BY id")
                .bind(category_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn fetch_web_page_ids(&self, id: i64) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT web_page_id FROM blog_posts_translations WHERE id = $1 AND web_page_id IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn insert(&self, record: &PostRecord) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO blog_posts (category_id, "timestamp", published, comments, seo, views, cover)
            VALUES ($1, $2, $3, $4, $5, 0, $6)
            RETURNING id
            "#,
        )
        .bind(record.category_id)
        .bind(record.timestamp)
        .bind(record.published)
        .bind(record.comments)
        .bind(record.seo)
        .bind(&record.cover)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert post: {:?}", e);
            AppError::Database(e)
        })?;

        Self::upsert_translations(&mut tx, id, record).await?;
        tx.commit().await?;

        Ok(id)
    }

    async fn update(&self, id: i64, record: &PostRecord) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE blog_posts
            SET category_id = $2, "timestamp" = $3, published = $4, comments = $5,
                seo = $6, cover = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(record.category_id)
        .bind(record.timestamp)
        .bind(record.published)
        .bind(record.comments)
        .bind(record.seo)
        .bind(&record.cover)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        Self::upsert_translations(&mut tx, id, record).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn attach_web_page(&self, id: i64, lang_id: i64, web_page_id: i64) -> Result<()> {
        sqlx::query(
            "UPDATE blog_posts_translations SET web_page_id = $3 WHERE id = $1 AND lang_id = $2",
        )
        .bind(id)
        .bind(lang_id)
        .bind(web_page_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace_attached(&self, id: i64, attached: &[i64]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM blog_posts_attached WHERE master_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if !attached.is_empty() {
            // Unknown ids are skipped instead of violating the foreign key
            sqlx::query(
                r#"
                INSERT INTO blog_posts_attached (master_id, slave_id)
                SELECT $1, id FROM blog_posts WHERE id = ANY($2)
                "#,
            )
            .bind(id)
            .bind(attached)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn increment_view_count(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE blog_posts SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_flag(&self, id: i64, flag: PostFlag, value: bool) -> Result<bool> {
        let sql = format!("UPDATE blog_posts SET {} = $2 WHERE id = $1", flag.column());
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        // Translations, gallery rows and attachment links cascade
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_category_id(&self, category_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE category_id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
