pub mod articles;
pub mod auth;
pub mod banners;
pub mod excel_files;
pub mod health;
pub mod sections;
pub mod uploads;
pub mod videos;
pub mod workflows;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Reads are public; every mutation of content requires an editor or admin
/// token.
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/verify                                     token check (auth)
/// /auth/me                                         current user (auth)
/// /auth/logout                                     logout (auth)
/// /auth/change-password                            change password (auth)
///
/// /sections                                        list, create
/// /sections/reorder                                batch reindex (PATCH)
/// /sections/{id}                                   get, update, delete
///
/// /articles, /banners, /videos                     list, create (multipart)
/// /articles/{id}, /banners/{id}, /videos/{id}      get, update (multipart), delete
///
/// /workflows                                       list, create
/// /workflows/{id}                                  get, update, delete
///
/// /excel-files                                     list, upload (multipart)
/// /excel-files/meta/categories                     distinct categories
/// /excel-files/meta/scenarios                      active scenario datasets
/// /excel-files/{id}                                get, update (multipart), delete
/// /excel-files/{id}/content                        chart payload
/// /excel-files/{id}/toggle-active                  flip visibility (POST)
///
/// /uploads/icon                                    workflow icon upload (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        // Landing page sections.
        .nest("/sections", sections::router())
        // Media-backed content.
        .nest("/articles", articles::router())
        .nest("/banners", banners::router())
        .nest("/videos", videos::router())
        // Workflow diagrams and the icons they reference.
        .nest("/workflows", workflows::router())
        .nest("/uploads", uploads::router())
        // Chart datasets.
        .nest("/excel-files", excel_files::router())
}
