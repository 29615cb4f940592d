//! Route definitions for the `/videos` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::videos;
use crate::state::AppState;

/// Routes mounted at `/videos`. Writes take `multipart/form-data`.
///
/// ```text
/// GET    /       -> list_videos
/// POST   /       -> create_video (editor)
/// GET    /{id}   -> get_video
/// PUT    /{id}   -> update_video (editor)
/// DELETE /{id}   -> delete_video (editor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(videos::list_videos).post(videos::create_video))
        .route(
            "/{id}",
            get(videos::get_video)
                .put(videos::update_video)
                .delete(videos::delete_video),
        )
}
