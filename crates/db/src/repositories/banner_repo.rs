//! Repository for the `banners` table.

use entyre_core::types::DbId;
use sqlx::PgPool;

use crate::models::banner::{Banner, CreateBanner, UpdateBanner};

/// Column list for banners queries.
const COLUMNS: &str = "id, title, image, image_url, image_public_id, active, created_at, updated_at";

pub struct BannerRepo;

impl BannerRepo {
    /// List banners newest first, optionally only active or inactive ones.
    pub async fn list(pool: &PgPool, active: Option<bool>) -> Result<Vec<Banner>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM banners
             WHERE ($1::bool IS NULL OR active = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Banner>(&query)
            .bind(active)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Banner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM banners WHERE id = $1");
        sqlx::query_as::<_, Banner>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateBanner) -> Result<Banner, sqlx::Error> {
        let query = format!(
            "INSERT INTO banners (title, image, image_url, image_public_id, active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Banner>(&query)
            .bind(&input.title)
            .bind(&input.image)
            .bind(&input.image_url)
            .bind(&input.image_public_id)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBanner,
    ) -> Result<Option<Banner>, sqlx::Error> {
        let query = format!(
            "UPDATE banners SET
                title = COALESCE($2, title),
                image = COALESCE($3, image),
                active = COALESCE($4, active),
                image_url = CASE WHEN $5 THEN $6 ELSE image_url END,
                image_public_id = CASE WHEN $5 THEN $7 ELSE image_public_id END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Banner>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.image)
            .bind(input.active)
            .bind(input.image_ref.is_some())
            .bind(input.image_ref.as_ref().map(|i| i.url.as_str()))
            .bind(input.image_ref.as_ref().and_then(|i| i.public_id.as_deref()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a banner, returning the removed row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Banner>, sqlx::Error> {
        let query = format!("DELETE FROM banners WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Banner>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
