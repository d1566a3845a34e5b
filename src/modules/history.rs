//! Activity history: one line per admin mutation, best effort.

use async_trait::async_trait;
use sqlx::PgPool;

#[async_trait]
pub trait HistoryWriter: Send + Sync {
    /// Record `template` with its `%s` placeholder replaced by `subject`.
    /// Failures are logged and swallowed.
    async fn write(&self, module: &str, template: &str, subject: &str);
}

pub fn render_message(template: &str, subject: &str) -> String {
    template.replacen("%s", subject, 1)
}

/// Writes into the `history` table
pub struct PgHistoryWriter {
    pool: PgPool,
}

impl PgHistoryWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryWriter for PgHistoryWriter {
    async fn write(&self, module: &str, template: &str, subject: &str) {
        let comment = render_message(template, subject);

        if let Err(e) = sqlx::query("INSERT INTO history (module, comment) VALUES ($1, $2)")
            .bind(module)
            .bind(&comment)
            .execute(&self.pool)
            .await
        {
            tracing::warn!("Failed to write history entry '{}': {:?}", comment, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_message() {
        assert_eq!(
            render_message("Category \"%s\" has been removed", "Tech"),
            "Category \"Tech\" has been removed"
        );
        assert_eq!(render_message("No placeholder", "x"), "No placeholder");
    }
}
