//! Handlers for the `/banners` resource.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use entyre_core::coerce;
use entyre_core::error::CoreError;
use entyre_core::types::DbId;
use entyre_db::models::banner::{Banner, CreateBanner, UpdateBanner};
use entyre_db::repositories::BannerRepo;
use entyre_media::MediaKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppResult;
use crate::extract::IdPath;
use crate::middleware::rbac::RequireEditor;
use crate::state::AppState;
use crate::upload::{self, MultipartForm, BANNERS_FOLDER};

#[derive(Debug, Default, Deserialize)]
pub struct BannerListParams {
    pub active: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteBannerResponse {
    pub message: &'static str,
    pub banner: Banner,
}

/// GET /api/v1/banners?active= -- newest first.
pub async fn list_banners(
    State(state): State<AppState>,
    Query(params): Query<BannerListParams>,
) -> AppResult<Json<Vec<Banner>>> {
    let active = match params.active.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            coerce::loose_bool(&Value::String(raw.to_string())).ok_or_else(|| {
                CoreError::InvalidFields(vec![format!(
                    "active must be true or false, got '{raw}'"
                )])
            })?,
        ),
        None => None,
    };
    Ok(Json(BannerRepo::list(&state.pool, active).await?))
}

/// GET /api/v1/banners/{id}
pub async fn get_banner(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<Banner>> {
    Ok(Json(find_banner(&state, id).await?))
}

/// POST /api/v1/banners (multipart: `title`, `image`, `imageUrl`, `active`, `file`)
pub async fn create_banner(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Banner>)> {
    let mut form = MultipartForm::read(multipart).await?;

    let mut errors = Vec::new();
    let title = form.required("title", &mut errors);
    let active = form.flag("active", &mut errors);
    upload::check_image(form.file.as_ref(), &mut errors);
    upload::ensure_valid(errors)?;

    let mut input = CreateBanner {
        title: title.unwrap_or_default(),
        image: form.nullable_text("image").unwrap_or_default(),
        image_url: form.text("imageUrl").map(str::to_string).filter(|s| !s.is_empty()),
        image_public_id: None,
        active: active.unwrap_or(true),
    };

    let stored =
        upload::store_optional_image(state.media.as_ref(), BANNERS_FOLDER, form.file.take())
            .await?;
    if let Some(stored) = &stored {
        input.image_url = Some(stored.url.clone());
        input.image_public_id = Some(stored.public_id.clone());
    }

    let banner = upload::persist_or_discard(
        state.media.as_ref(),
        stored.as_ref().map(|s| (s.public_id.as_str(), MediaKind::Image)),
        BannerRepo::create(&state.pool, &input),
    )
    .await?;

    tracing::info!(banner_id = banner.id, user_id = user.user_id, "Banner created");
    Ok((StatusCode::CREATED, Json(banner)))
}

/// PUT /api/v1/banners/{id}
pub async fn update_banner(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
    multipart: Multipart,
) -> AppResult<Json<Banner>> {
    let existing = find_banner(&state, id).await?;
    let mut form = MultipartForm::read(multipart).await?;

    let mut errors = Vec::new();
    let mut input = UpdateBanner {
        title: form.non_blank("title", &mut errors),
        image: form.nullable_text("image"),
        image_ref: None,
        active: form.flag("active", &mut errors),
    };
    upload::check_image(form.file.as_ref(), &mut errors);
    upload::ensure_valid(errors)?;

    let stored =
        upload::store_optional_image(state.media.as_ref(), BANNERS_FOLDER, form.file.take())
            .await?;
    input.image_ref = upload::replacement_image(
        stored.as_ref(),
        form.text("imageUrl"),
        existing.image_url.as_deref(),
    );

    let updated = upload::update_or_discard(
        state.media.as_ref(),
        stored.as_ref().map(|s| (s.public_id.as_str(), MediaKind::Image)),
        CoreError::NotFound {
            entity: "Banner",
            id,
        },
        BannerRepo::update(&state.pool, id, &input),
    )
    .await?;

    upload::discard_replaced(
        state.media.as_ref(),
        existing.image_public_id.as_deref(),
        input.image_ref.as_ref(),
        MediaKind::Image,
        "image replaced",
    )
    .await;

    tracing::info!(banner_id = id, user_id = user.user_id, "Banner updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/banners/{id}
pub async fn delete_banner(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
) -> AppResult<Json<DeleteBannerResponse>> {
    let banner = BannerRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Banner",
            id,
        })?;

    if let Some(public_id) = banner.image_public_id.as_deref() {
        upload::discard(state.media.as_ref(), public_id, MediaKind::Image, "banner deleted").await;
    }

    tracing::info!(banner_id = id, user_id = user.user_id, "Banner deleted");
    Ok(Json(DeleteBannerResponse {
        message: "Banner deleted successfully",
        banner,
    }))
}

async fn find_banner(state: &AppState, id: DbId) -> AppResult<Banner> {
    BannerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Banner",
                id,
            }
            .into()
        })
}
