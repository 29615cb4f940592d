//! Route definitions for standalone uploads.

use axum::routing::post;
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// Routes mounted at `/uploads`.
///
/// ```text
/// POST /icon   -> upload_icon (editor, multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/icon", post(uploads::upload_icon))
}
