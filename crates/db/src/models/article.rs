//! News articles.

use entyre_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::ImageRef;

/// A row from the `articles` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: DbId,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct CreateArticle {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    /// Replaces both image columns when set, clearing a stale public id.
    pub image: Option<ImageRef>,
}
