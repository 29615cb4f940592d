//! Handlers for the `/videos` resource. The uploaded `file` is the
//! thumbnail; the video itself is an external URL.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use entyre_core::error::CoreError;
use entyre_core::types::DbId;
use entyre_db::models::video::{CreateVideo, UpdateVideo, Video};
use entyre_db::repositories::VideoRepo;
use entyre_media::MediaKind;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::IdPath;
use crate::middleware::rbac::RequireEditor;
use crate::state::AppState;
use crate::upload::{self, MultipartForm, VIDEO_THUMBNAILS_FOLDER};

#[derive(Debug, Serialize)]
pub struct DeleteVideoResponse {
    pub message: &'static str,
    pub video: Video,
}

/// GET /api/v1/videos -- newest first.
pub async fn list_videos(State(state): State<AppState>) -> AppResult<Json<Vec<Video>>> {
    Ok(Json(VideoRepo::list(&state.pool).await?))
}

/// GET /api/v1/videos/{id}
pub async fn get_video(State(state): State<AppState>, IdPath(id): IdPath) -> AppResult<Json<Video>> {
    Ok(Json(find_video(&state, id).await?))
}

/// POST /api/v1/videos (multipart: `title`, `description`, `videoUrl`, `thumbnailUrl`, `file`)
pub async fn create_video(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Video>)> {
    let mut form = MultipartForm::read(multipart).await?;

    let mut errors = Vec::new();
    let title = form.required("title", &mut errors);
    let video_url = form.required("videoUrl", &mut errors);
    upload::check_image(form.file.as_ref(), &mut errors);
    upload::ensure_valid(errors)?;

    let mut input = CreateVideo {
        title: title.unwrap_or_default(),
        description: form.nullable_text("description").unwrap_or_default(),
        video_url: video_url.unwrap_or_default(),
        thumbnail_url: form
            .text("thumbnailUrl")
            .map(str::to_string)
            .filter(|s| !s.is_empty()),
        thumbnail_public_id: None,
    };

    let stored = upload::store_optional_image(
        state.media.as_ref(),
        VIDEO_THUMBNAILS_FOLDER,
        form.file.take(),
    )
    .await?;
    if let Some(stored) = &stored {
        input.thumbnail_url = Some(stored.url.clone());
        input.thumbnail_public_id = Some(stored.public_id.clone());
    }

    let video = upload::persist_or_discard(
        state.media.as_ref(),
        stored.as_ref().map(|s| (s.public_id.as_str(), MediaKind::Image)),
        VideoRepo::create(&state.pool, &input),
    )
    .await?;

    tracing::info!(video_id = video.id, user_id = user.user_id, "Video created");
    Ok((StatusCode::CREATED, Json(video)))
}

/// PUT /api/v1/videos/{id}
pub async fn update_video(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
    multipart: Multipart,
) -> AppResult<Json<Video>> {
    let existing = find_video(&state, id).await?;
    let mut form = MultipartForm::read(multipart).await?;

    let mut errors = Vec::new();
    let mut input = UpdateVideo {
        title: form.non_blank("title", &mut errors),
        description: form.nullable_text("description"),
        video_url: form.non_blank("videoUrl", &mut errors),
        thumbnail: None,
    };
    upload::check_image(form.file.as_ref(), &mut errors);
    upload::ensure_valid(errors)?;

    let stored = upload::store_optional_image(
        state.media.as_ref(),
        VIDEO_THUMBNAILS_FOLDER,
        form.file.take(),
    )
    .await?;
    input.thumbnail = upload::replacement_image(
        stored.as_ref(),
        form.text("thumbnailUrl"),
        existing.thumbnail_url.as_deref(),
    );

    let updated = upload::update_or_discard(
        state.media.as_ref(),
        stored.as_ref().map(|s| (s.public_id.as_str(), MediaKind::Image)),
        CoreError::NotFound { entity: "Video", id },
        VideoRepo::update(&state.pool, id, &input),
    )
    .await?;

    upload::discard_replaced(
        state.media.as_ref(),
        existing.thumbnail_public_id.as_deref(),
        input.thumbnail.as_ref(),
        MediaKind::Image,
        "thumbnail replaced",
    )
    .await;

    tracing::info!(video_id = id, user_id = user.user_id, "Video updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/videos/{id}
pub async fn delete_video(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
) -> AppResult<Json<DeleteVideoResponse>> {
    let video = VideoRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Video", id })?;

    if let Some(public_id) = video.thumbnail_public_id.as_deref() {
        upload::discard(state.media.as_ref(), public_id, MediaKind::Image, "video deleted").await;
    }

    tracing::info!(video_id = id, user_id = user.user_id, "Video deleted");
    Ok(Json(DeleteVideoResponse {
        message: "Video deleted successfully",
        video,
    }))
}

async fn find_video(state: &AppState, id: DbId) -> AppResult<Video> {
    VideoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Video", id }.into())
}
