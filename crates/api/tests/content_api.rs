//! HTTP-level integration tests for the media-backed content resources
//! (`/articles`, `/banners`, `/videos`) and the icon upload.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{body_json, delete_auth, get, send_multipart, FilePart};
use entyre_media::MemoryMediaStore;
use sqlx::PgPool;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake image bytes";

fn png(name: &str) -> FilePart<'_> {
    FilePart {
        file_name: name,
        content_type: "image/png",
        bytes: PNG,
    }
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_article_lifecycle_manages_remote_images(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let media = Arc::new(MemoryMediaStore::new());
    let app = common::build_test_app_with_media(pool, Arc::clone(&media));

    let response = send_multipart(
        app.clone(),
        Method::POST,
        "/api/v1/articles",
        &token,
        &[("title", "Tyre recycling"), ("summary", "null"), ("content", "Body")],
        Some(png("cover.png")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["summary"], "");
    let first_image = created["imagePublicId"].as_str().unwrap().to_string();
    assert!(first_image.starts_with("entyre/articles/"));
    assert!(media.contains(&first_image).await);

    // Replace the image; the old object goes away.
    let uri = format!("/api/v1/articles/{}", created["id"]);
    let response = send_multipart(
        app.clone(),
        Method::PUT,
        &uri,
        &token,
        &[("content", "Updated body")],
        Some(png("cover2.png")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["title"], "Tyre recycling");
    assert_eq!(updated["content"], "Updated body");
    let second_image = updated["imagePublicId"].as_str().unwrap().to_string();
    assert_ne!(first_image, second_image);
    assert!(!media.contains(&first_image).await);
    assert!(media.contains(&second_image).await);

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Article deleted successfully");
    assert!(media.is_empty().await);

    let response = get(app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_article_requires_title_and_image_type(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let media = Arc::new(MemoryMediaStore::new());
    let app = common::build_test_app_with_media(pool, Arc::clone(&media));

    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/articles",
        &token,
        &[("summary", "No title")],
        Some(FilePart {
            file_name: "notes.pdf",
            content_type: "application/pdf",
            bytes: b"%PDF",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["details"].as_array().unwrap().len(), 2);
    assert!(media.is_empty().await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_upload_returns_502_and_stores_nothing(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let media = Arc::new(MemoryMediaStore::new());
    media.set_fail_uploads(true);
    let app = common::build_test_app_with_media(pool, Arc::clone(&media));

    let response = send_multipart(
        app.clone(),
        Method::POST,
        "/api/v1/articles",
        &token,
        &[("title", "Doomed")],
        Some(png("cover.png")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "UPSTREAM_ERROR");

    let list = body_json(get(app, "/api/v1/articles").await).await;
    assert!(list.as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Banners
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_banners_default_active_and_filter(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let app = common::build_test_app(pool);

    let response = send_multipart(
        app.clone(),
        Method::POST,
        "/api/v1/banners",
        &token,
        &[("title", "Shown"), ("image", "null")],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let shown = body_json(response).await;
    assert_eq!(shown["active"], true);
    assert_eq!(shown["image"], "");

    let response = send_multipart(
        app.clone(),
        Method::POST,
        "/api/v1/banners",
        &token,
        &[("title", "Hidden"), ("active", "false")],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(get(app.clone(), "/api/v1/banners?active=true").await).await;
    let titles: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Shown"]);

    let all = body_json(get(app.clone(), "/api/v1/banners").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let response = get(app, "/api/v1/banners?active=perhaps").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_banner_external_url_releases_uploaded_image(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let media = Arc::new(MemoryMediaStore::new());
    let app = common::build_test_app_with_media(pool, Arc::clone(&media));

    let response = send_multipart(
        app.clone(),
        Method::POST,
        "/api/v1/banners",
        &token,
        &[("title", "Hero")],
        Some(png("hero.png")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let uploaded = created["imagePublicId"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/banners/{}", created["id"]);

    // Sending the current URL back is not a replacement.
    let current_url = created["imageUrl"].as_str().unwrap().to_string();
    let response = send_multipart(
        app.clone(),
        Method::PUT,
        &uri,
        &token,
        &[("imageUrl", current_url.as_str()), ("title", "Hero 2")],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["imagePublicId"], uploaded.as_str());
    assert!(media.destroyed().await.is_empty());

    let response = send_multipart(
        app.clone(),
        Method::PUT,
        &uri,
        &token,
        &[("imageUrl", "https://elsewhere/x.png")],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["imageUrl"], "https://elsewhere/x.png");
    assert!(updated["imagePublicId"].is_null());
    assert_eq!(media.destroyed().await, vec![uploaded.clone()]);
    assert!(!media.contains(&uploaded).await);

    // Deleting the banner now has nothing of ours to destroy.
    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(media.destroyed().await, vec![uploaded]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_video_thumbnail_url_replaces_uploaded_thumbnail(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let media = Arc::new(MemoryMediaStore::new());
    let app = common::build_test_app_with_media(pool, Arc::clone(&media));

    let response = send_multipart(
        app.clone(),
        Method::POST,
        "/api/v1/videos",
        &token,
        &[("title", "Tour"), ("videoUrl", "https://youtu.be/tour")],
        Some(png("thumb.png")),
    )
    .await;
    let created = body_json(response).await;
    let thumb = created["thumbnailPublicId"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/videos/{}", created["id"]);
    let response = send_multipart(
        app,
        Method::PUT,
        &uri,
        &token,
        &[("thumbnailUrl", "https://img.youtube.com/vi/tour/0.jpg")],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["thumbnailUrl"], "https://img.youtube.com/vi/tour/0.jpg");
    assert!(updated["thumbnailPublicId"].is_null());
    assert!(!media.contains(&thumb).await);
}

// ---------------------------------------------------------------------------
// Videos
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_video_requires_url_and_stores_thumbnail(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let media = Arc::new(MemoryMediaStore::new());
    let app = common::build_test_app_with_media(pool, Arc::clone(&media));

    let response = send_multipart(
        app.clone(),
        Method::POST,
        "/api/v1/videos",
        &token,
        &[("title", "Intro")],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/videos",
        &token,
        &[("title", "Intro"), ("videoUrl", "https://youtu.be/abc")],
        Some(png("thumb.png")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["videoUrl"], "https://youtu.be/abc");
    let thumb = json["thumbnailPublicId"].as_str().unwrap();
    assert!(thumb.starts_with("entyre/videosThumbnail/"));
    assert!(media.contains(thumb).await);
}

// ---------------------------------------------------------------------------
// Icon upload
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_icon_upload_returns_url(pool: PgPool) {
    let token = common::editor_token(&pool).await;
    let media = Arc::new(MemoryMediaStore::new());
    let app = common::build_test_app_with_media(pool, Arc::clone(&media));

    let response = send_multipart(
        app.clone(),
        Method::POST,
        "/api/v1/uploads/icon",
        &token,
        &[],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/uploads/icon",
        &token,
        &[],
        Some(png("gear.png")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["fileUrl"].as_str().unwrap().starts_with("memory://"));
    let public_id = json["publicId"].as_str().unwrap();
    assert!(public_id.starts_with("entyre/workflowFiles/"));
    assert_eq!(media.bytes_of(public_id).await.as_deref(), Some(PNG));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_uploads_require_an_editor(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = send_multipart(
        app,
        Method::POST,
        "/api/v1/articles",
        "not-a-token",
        &[("title", "x")],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
