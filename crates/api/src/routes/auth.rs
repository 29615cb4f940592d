//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login            -> login
/// GET  /verify           -> verify (requires auth)
/// GET  /me               -> me (requires auth)
/// POST /logout           -> logout (requires auth)
/// POST /change-password  -> change_password (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/verify", get(auth::verify))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        .route("/change-password", post(auth::change_password))
}
