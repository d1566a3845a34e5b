use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{
    Category, CategoryBcRow, CategoryNode, CategoryRecord, CategoryWithCount,
};

/// Persistence of categories and their translations
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn fetch_all(&self, lang_id: i64) -> Result<Vec<Category>>;

    async fn fetch_by_id(&self, id: i64, lang_id: i64) -> Result<Option<Category>>;

    /// Every language of one category
    async fn fetch_translations(&self, id: i64) -> Result<Vec<Category>>;

    async fn fetch_children_by_parent_id(&self, parent_id: i64, lang_id: i64)
        -> Result<Vec<Category>>;

    async fn fetch_bc_data(&self, lang_id: i64) -> Result<Vec<CategoryBcRow>>;

    async fn fetch_tree_nodes(&self) -> Result<Vec<CategoryNode>>;

    async fn fetch_all_with_post_count(
        &self,
        lang_id: i64,
        published_only: bool,
    ) -> Result<Vec<CategoryWithCount>>;

    async fn fetch_web_page_ids(&self, id: i64) -> Result<Vec<i64>>;

    async fn exists(&self, id: i64) -> Result<bool>;

    /// Insert the category and all translations, returning the new id
    async fn insert(&self, record: &CategoryRecord) -> Result<i64>;

    /// Overwrite the shared row and upsert the given translations
    async fn update(&self, id: i64, record: &CategoryRecord) -> Result<bool>;

    async fn attach_web_page(&self, id: i64, lang_id: i64, web_page_id: i64) -> Result<()>;

    async fn delete_by_id(&self, id: i64) -> Result<bool>;
}

const SELECT_CATEGORY: &str = r#"
    SELECT c.id, c.parent_id, t.lang_id, t.web_page_id, COALESCE(w.slug, '') AS slug,
           t.name, t.title, t.description, t.keywords, t.meta_description,
           c."order", c.seo, c.cover
    FROM blog_categories c
    JOIN blog_categories_translations t ON t.id = c.id
    LEFT JOIN web_pages w ON w.id = t.web_page_id
"#;

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert_translations(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        record: &CategoryRecord,
    ) -> Result<()> {
        for t in &record.translations {
            sqlx::query(
                r#"
                INSERT INTO blog_categories_translations
                    (id, lang_id, name, title, description, keywords, meta_description)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id, lang_id) DO UPDATE SET
                    name = EXCLUDED.name,
                    title = EXCLUDED.title,
                    description = EXCLUDED.description,
                    keywords = EXCLUDED.keywords,
                    meta_description = EXCLUDED.meta_description
                "#,
            )
            .bind(id)
            .bind(t.lang_id)
            .bind(&t.name)
            .bind(&t.title)
            .bind(&t.description)
            .bind(&t.keywords)
            .bind(&t.meta_description)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn fetch_all(&self, lang_id: i64) -> Result<Vec<Category>> {
        let sql = format!(r#"{} WHERE t.lang_id = $1 ORDER BY c."order", c.id"#, SELECT_CATEGORY);
        sqlx::query_as::<_, Category>(&sql)
            .bind(lang_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn fetch_by_id(&self, id: i64, lang_id: i64) -> Result<Option<Category>> {
        let sql = format!("{} WHERE c.id = $1 AND t.lang_id = $2", SELECT_CATEGORY);
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(lang_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn fetch_translations(&self, id: i64) -> Result<Vec<Category>> {
        let sql = format!("{} WHERE c.id = $1 ORDER BY t.lang_id", SELECT_CATEGORY);
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn fetch_children_by_parent_id(
        &self,
        parent_id: i64,
        lang_id: i64,
    ) -> Result<Vec<Category>> {
        let sql = format!(
            r#"{} WHERE c.parent_id = $1 AND t.lang_id = $2 ORDER BY c."order", c.id"#,
            SELECT_CATEGORY
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(parent_id)
            .bind(lang_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn fetch_bc_data(&self, lang_id: i64) -> Result<Vec<CategoryBcRow>> {
        Ok(sqlx::query_as::<_, CategoryBcRow>(
            r#"
            SELECT c.id, c.parent_id, t.lang_id, t.name, COALESCE(w.slug, '') AS slug
            FROM blog_categories c
            JOIN blog_categories_translations t ON t.id = c.id
            LEFT JOIN web_pages w ON w.id = t.web_page_id
            WHERE t.lang_id = $1
            "#,
        )
        .bind(lang_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_tree_nodes(&self) -> Result<Vec<CategoryNode>> {
        Ok(sqlx::query_as::<_, CategoryNode>(
            r#"SELECT id, parent_id, "order" FROM blog_categories"#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_all_with_post_count(
        &self,
        lang_id: i64,
        published_only: bool,
    ) -> Result<Vec<CategoryWithCount>> {
        Ok(sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT c.id, t.lang_id, t.name, COALESCE(w.slug, '') AS slug,
                   COUNT(p.id) AS post_count
            FROM blog_categories c
            JOIN blog_categories_translations t ON t.id = c.id
            LEFT JOIN web_pages w ON w.id = t.web_page_id
            LEFT JOIN blog_posts p ON p.category_id = c.id AND (p.published OR NOT $2)
            WHERE t.lang_id = $1
            GROUP BY c.id, t.lang_id, t.name, w.slug, c."order"
            ORDER BY c."order", c.id
            "#,
        )
        .bind(lang_id)
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_web_page_ids(&self, id: i64) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT web_page_id FROM blog_categories_translations WHERE id = $1 AND web_page_id IS NOT NULL",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM blog_categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert(&self, record: &CategoryRecord) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO blog_categories (parent_id, "order", seo, cover)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(record.parent_id)
        .bind(record.order)
        .bind(record.seo)
        .bind(&record.cover)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert category: {:?}", e);
            AppError::Database(e)
        })?;

        Self::upsert_translations(&mut tx, id, record).await?;
        tx.commit().await?;

        Ok(id)
    }

    async fn update(&self, id: i64, record: &CategoryRecord) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE blog_categories
            SET parent_id = $2, "order" = $3, seo = $4, cover = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(record.parent_id)
        .bind(record.order)
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
            "UPDATE blog_categories_translations SET web_page_id = $3 WHERE id = $1 AND lang_id = $2",
        )
        .bind(id)
        .bind(lang_id)
        .bind(web_page_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        // Translations go with the row (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM blog_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
