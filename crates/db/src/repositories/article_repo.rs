//! Repository for the `articles` table.

use entyre_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::{Article, CreateArticle, UpdateArticle};

/// Column list for articles queries.
const COLUMNS: &str =
    "id, title, summary, content, image_url, image_public_id, created_at, updated_at";

pub struct ArticleRepo;

impl ArticleRepo {
    /// List all articles, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Article>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateArticle) -> Result<Article, sqlx::Error> {
        let query = format!(
            "INSERT INTO articles (title, summary, content, image_url, image_public_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(&input.title)
            .bind(&input.summary)
            .bind(&input.content)
            .bind(&input.image_url)
            .bind(&input.image_public_id)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateArticle,
    ) -> Result<Option<Article>, sqlx::Error> {
        let query = format!(
            "UPDATE articles SET
                title = COALESCE($2, title),
                summary = COALESCE($3, summary),
                content = COALESCE($4, content),
                image_url = CASE WHEN $5 THEN $6 ELSE image_url END,
                image_public_id = CASE WHEN $5 THEN $7 ELSE image_public_id END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.summary)
            .bind(&input.content)
            .bind(input.image.is_some())
            .bind(input.image.as_ref().map(|i| i.url.as_str()))
            .bind(input.image.as_ref().and_then(|i| i.public_id.as_deref()))
            .fetch_optional(pool)
            .await
    }

    /// Delete an article, returning the removed row so its image can be
    /// released.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("DELETE FROM articles WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
