//! Standalone image uploads that are not tied to a stored record.

use axum::extract::{Multipart, State};
use axum::Json;
use entyre_core::error::CoreError;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireEditor;
use crate::state::AppState;
use crate::upload::{self, MultipartForm, ICONS_FOLDER};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IconUploadResponse {
    pub file_url: String,
    pub public_id: String,
}

/// POST /api/v1/uploads/icon (multipart: `file`)
///
/// Stores a workflow node icon and returns its URL. The caller embeds the
/// URL in the workflow document, so nothing is written to the database.
pub async fn upload_icon(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    multipart: Multipart,
) -> AppResult<Json<IconUploadResponse>> {
    let mut form = MultipartForm::read(multipart).await?;

    let mut errors = Vec::new();
    match form.file.as_ref() {
        Some(file) => upload::check_image(Some(file), &mut errors),
        None => errors.push("file is required".to_string()),
    }
    upload::ensure_valid(errors)?;

    let file = form
        .file
        .take()
        .ok_or_else(|| CoreError::InvalidFields(vec!["file is required".into()]))?;
    let stored = upload::store_image(state.media.as_ref(), ICONS_FOLDER, file).await?;

    tracing::info!(public_id = %stored.public_id, user_id = user.user_id, "Icon uploaded");
    Ok(Json(IconUploadResponse {
        file_url: stored.url,
        public_id: stored.public_id,
    }))
}
