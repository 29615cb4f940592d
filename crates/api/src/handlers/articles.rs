//! Handlers for the `/articles` resource.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use entyre_core::error::CoreError;
use entyre_core::types::DbId;
use entyre_db::models::article::{Article, CreateArticle, UpdateArticle};
use entyre_db::repositories::ArticleRepo;
use entyre_media::MediaKind;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::IdPath;
use crate::middleware::rbac::RequireEditor;
use crate::state::AppState;
use crate::upload::{self, MultipartForm, ARTICLES_FOLDER};

#[derive(Debug, Serialize)]
pub struct DeleteArticleResponse {
    pub message: &'static str,
    pub article: Article,
}

/// GET /api/v1/articles -- newest first.
pub async fn list_articles(State(state): State<AppState>) -> AppResult<Json<Vec<Article>>> {
    Ok(Json(ArticleRepo::list(&state.pool).await?))
}

/// GET /api/v1/articles/{id}
pub async fn get_article(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<Article>> {
    Ok(Json(find_article(&state, id).await?))
}

/// POST /api/v1/articles (multipart: `title`, `summary`, `content`, `imageUrl`, `file`)
pub async fn create_article(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Article>)> {
    let mut form = MultipartForm::read(multipart).await?;

    let mut errors = Vec::new();
    let title = form.required("title", &mut errors);
    upload::check_image(form.file.as_ref(), &mut errors);
    upload::ensure_valid(errors)?;

    let mut input = CreateArticle {
        title: title.unwrap_or_default(),
        summary: form.nullable_text("summary").unwrap_or_default(),
        content: form.nullable_text("content").unwrap_or_default(),
        image_url: form.text("imageUrl").map(str::to_string).filter(|s| !s.is_empty()),
        image_public_id: None,
    };

    let stored =
        upload::store_optional_image(state.media.as_ref(), ARTICLES_FOLDER, form.file.take())
            .await?;
    if let Some(stored) = &stored {
        input.image_url = Some(stored.url.clone());
        input.image_public_id = Some(stored.public_id.clone());
    }

    let article = upload::persist_or_discard(
        state.media.as_ref(),
        stored.as_ref().map(|s| (s.public_id.as_str(), MediaKind::Image)),
        ArticleRepo::create(&state.pool, &input),
    )
    .await?;

    tracing::info!(article_id = article.id, user_id = user.user_id, "Article created");
    Ok((StatusCode::CREATED, Json(article)))
}

/// PUT /api/v1/articles/{id}
///
/// Only sent fields change. A new `file` or a different `imageUrl`
/// replaces the image; the previously owned remote object is destroyed
/// once the row points elsewhere.
pub async fn update_article(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
    multipart: Multipart,
) -> AppResult<Json<Article>> {
    let existing = find_article(&state, id).await?;
    let mut form = MultipartForm::read(multipart).await?;

    let mut errors = Vec::new();
    let mut input = UpdateArticle {
        title: form.non_blank("title", &mut errors),
        summary: form.nullable_text("summary"),
        content: form.nullable_text("content"),
        image: None,
    };
    upload::check_image(form.file.as_ref(), &mut errors);
    upload::ensure_valid(errors)?;

    let stored =
        upload::store_optional_image(state.media.as_ref(), ARTICLES_FOLDER, form.file.take())
            .await?;
    input.image = upload::replacement_image(
        stored.as_ref(),
        form.text("imageUrl"),
        existing.image_url.as_deref(),
    );

    let updated = upload::update_or_discard(
        state.media.as_ref(),
        stored.as_ref().map(|s| (s.public_id.as_str(), MediaKind::Image)),
        CoreError::NotFound {
            entity: "Article",
            id,
        },
        ArticleRepo::update(&state.pool, id, &input),
    )
    .await?;

    upload::discard_replaced(
        state.media.as_ref(),
        existing.image_public_id.as_deref(),
        input.image.as_ref(),
        MediaKind::Image,
        "image replaced",
    )
    .await;

    tracing::info!(article_id = id, user_id = user.user_id, "Article updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/articles/{id}
pub async fn delete_article(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
) -> AppResult<Json<DeleteArticleResponse>> {
    let article = ArticleRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Article",
            id,
        })?;

    if let Some(public_id) = article.image_public_id.as_deref() {
        upload::discard(state.media.as_ref(), public_id, MediaKind::Image, "article deleted").await;
    }

    tracing::info!(article_id = id, user_id = user.user_id, "Article deleted");
    Ok(Json(DeleteArticleResponse {
        message: "Article deleted successfully",
        article,
    }))
}

async fn find_article(state: &AppState, id: DbId) -> AppResult<Article> {
    ArticleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Article",
                id,
            }
            .into()
        })
}
