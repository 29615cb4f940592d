//! Repository for the `videos` table.

use entyre_core::types::DbId;
use sqlx::PgPool;

use crate::models::video::{CreateVideo, UpdateVideo, Video};

/// Column list for videos queries.
const COLUMNS: &str = "id, title, description, video_url, thumbnail_url, thumbnail_public_id, \
    created_at, updated_at";

pub struct VideoRepo;

impl VideoRepo {
    /// List all videos, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Video>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateVideo) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos (title, description, video_url, thumbnail_url, thumbnail_public_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.video_url)
            .bind(&input.thumbnail_url)
            .bind(&input.thumbnail_public_id)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVideo,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                video_url = COALESCE($4, video_url),
                thumbnail_url = CASE WHEN $5 THEN $6 ELSE thumbnail_url END,
                thumbnail_public_id = CASE WHEN $5 THEN $7 ELSE thumbnail_public_id END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.video_url)
            .bind(input.thumbnail.is_some())
            .bind(input.thumbnail.as_ref().map(|i| i.url.as_str()))
            .bind(input.thumbnail.as_ref().and_then(|i| i.public_id.as_deref()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a video, returning the removed row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("DELETE FROM videos WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
