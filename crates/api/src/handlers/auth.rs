//! Handlers for the `/auth` resource (login, verify, me, logout, change-password).

use std::sync::LazyLock;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use entyre_core::error::CoreError;
use entyre_core::login_limiter::LoginAttemptTracker;
use entyre_db::models::user::User;
use entyre_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, ClientIp};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Verified against when the username is unknown, so both failure paths
/// cost one Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("entyre-timing-equalizer").ok());

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for `POST /auth/change-password`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Failed attempts are counted per
/// client address and username; a locked-out key gets 429 before any
/// credential check runs.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let username = input.username.trim().to_lowercase();
    let mut errors = Vec::new();
    if username.is_empty() {
        errors.push("username is required".to_string());
    }
    if input.password.is_empty() {
        errors.push("password is required".to_string());
    }
    if !errors.is_empty() {
        return Err(CoreError::InvalidFields(errors).into());
    }

    let key = LoginAttemptTracker::key(&client_ip, &username);
    state.login_attempts.lock().await.reserve(&key, Utc::now())?;

    let user = match check_credentials(&state, &username, &input.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(%username, client_ip = %client_ip, "Failed login attempt");
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()).into());
        }
        Err(e) => {
            state.login_attempts.lock().await.refund(&key);
            return Err(e);
        }
    };

    if !user.is_active {
        state.login_attempts.lock().await.refund(&key);
        return Err(CoreError::Forbidden("Account is deactivated".into()).into());
    }

    state.login_attempts.lock().await.record_success(&key);
    UserRepo::record_login(&state.pool, user.id).await?;

    let token = generate_access_token(user.id, &user.username, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, client_ip = %client_ip, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        expires_in: state.config.jwt.expiry_secs(),
        user,
    }))
}

/// GET /api/v1/auth/verify
///
/// Confirms the token is valid and its account still exists and is active.
pub async fn verify(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<VerifyResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| CoreError::Unauthorized("User does not exist or is inactive".into()))?;

    Ok(Json(VerifyResponse { valid: true, user }))
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        })?;

    Ok(Json(UserResponse { user }))
}

/// POST /api/v1/auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout(auth_user: AuthUser) -> Json<MessageResponse> {
    tracing::info!(user_id = auth_user.user_id, "User logged out");
    Json(MessageResponse {
        message: "Logout successful",
    })
}

/// POST /api/v1/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    if input.current_password.is_empty() || input.new_password.is_empty() {
        return Err(AppError::BadRequest(
            "Current and new passwords are required".into(),
        ));
    }
    validate_password_strength(&input.new_password)
        .map_err(|msg| CoreError::InvalidFields(vec![msg]))?;

    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        })?;

    let current_valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_valid {
        return Err(CoreError::Unauthorized("Current password is incorrect".into()).into());
    }

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &new_hash).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(Json(MessageResponse {
        message: "Password changed successfully",
    }))
}

/// The user behind `username` if `password` matches. Unknown usernames
/// still pay for one Argon2 verification.
async fn check_credentials(
    state: &AppState,
    username: &str,
    password: &str,
) -> AppResult<Option<User>> {
    let Some(user) = UserRepo::find_by_username(&state.pool, username).await? else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = verify_password(password, dummy);
        }
        return Ok(None);
    };
    let valid = verify_password(password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    Ok(valid.then_some(user))
}
