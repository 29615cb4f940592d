//! Embedded videos with an optional uploaded thumbnail.

use entyre_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::ImageRef;

/// A row from the `videos` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub thumbnail_public_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct CreateVideo {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub thumbnail_public_id: Option<String>,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    /// Replaces both thumbnail columns when set, clearing a stale public id.
    pub thumbnail: Option<ImageRef>,
}
