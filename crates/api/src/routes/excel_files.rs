//! Route definitions for the `/excel-files` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::excel_files;
use crate::state::AppState;

/// Routes mounted at `/excel-files`.
///
/// ```text
/// GET    /                      -> list_excel_files
/// POST   /                      -> create_excel_file (editor, multipart)
/// GET    /meta/categories       -> list_categories
/// GET    /meta/scenarios        -> list_scenarios
/// GET    /{id}                  -> get_excel_file
/// PUT    /{id}                  -> update_excel_file (editor, multipart)
/// DELETE /{id}                  -> delete_excel_file (editor)
/// GET    /{id}/content          -> get_excel_content
/// POST   /{id}/toggle-active    -> toggle_active (editor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(excel_files::list_excel_files).post(excel_files::create_excel_file),
        )
        .route("/meta/categories", get(excel_files::list_categories))
        .route("/meta/scenarios", get(excel_files::list_scenarios))
        .route(
            "/{id}",
            get(excel_files::get_excel_file)
                .put(excel_files::update_excel_file)
                .delete(excel_files::delete_excel_file),
        )
        .route("/{id}/content", get(excel_files::get_excel_content))
        .route("/{id}/toggle-active", post(excel_files::toggle_active))
}
