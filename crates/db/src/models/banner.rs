//! Home-page banners.

use entyre_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::ImageRef;

/// A row from the `banners` table.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: DbId,
    pub title: String,
    pub image: String,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateBanner {
    pub title: String,
    pub image: String,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
    pub active: bool,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateBanner {
    pub title: Option<String>,
    pub image: Option<String>,
    /// Replaces both image columns when set, clearing a stale public id.
    pub image_ref: Option<ImageRef>,
    pub active: Option<bool>,
}
