//! Route definitions for the `/sections` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::sections;
use crate::state::AppState;

/// Routes mounted at `/sections`.
///
/// ```text
/// GET    /          -> list_sections
/// POST   /          -> create_section (editor)
/// PATCH  /reorder   -> reorder_sections (editor)
/// GET    /{id}      -> get_section
/// PUT    /{id}      -> update_section (editor)
/// DELETE /{id}      -> delete_section (editor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sections::list_sections).post(sections::create_section))
        .route("/reorder", patch(sections::reorder_sections))
        .route(
            "/{id}",
            get(sections::get_section)
                .put(sections::update_section)
                .delete(sections::delete_section),
        )
}
