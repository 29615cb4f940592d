//! Route definitions for the `/articles` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::articles;
use crate::state::AppState;

/// Routes mounted at `/articles`. Writes take `multipart/form-data`.
///
/// ```text
/// GET    /       -> list_articles
/// POST   /       -> create_article (editor)
/// GET    /{id}   -> get_article
/// PUT    /{id}   -> update_article (editor)
/// DELETE /{id}   -> delete_article (editor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(articles::list_articles).post(articles::create_article))
        .route(
            "/{id}",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
}
