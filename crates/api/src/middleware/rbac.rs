//! Role-based access control (RBAC) extractors.
//!
//! The extractor wraps [`AuthUser`] and rejects requests whose role may not
//! change site content. Admins pass every check.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use entyre_core::error::CoreError;
use entyre_core::roles::can_edit_content;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a content-editing role (`editor` or `admin`). Rejects with 403 otherwise.
///
/// ```ignore
/// async fn create(RequireEditor(user): RequireEditor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireEditor(pub AuthUser);

impl FromRequestParts<AppState> for RequireEditor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_edit_content(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Editor or Admin role required".into(),
            )));
        }
        Ok(RequireEditor(user))
    }
}
