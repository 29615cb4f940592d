//! HTTP-level integration tests for the `/auth` endpoints.
//!
//! Covers login, the failed-login lockout, token verification, the
//! current-user lookup, and password changes.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::RETRY_AFTER;
use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, post_json_auth, TEST_PASSWORD};
use entyre_db::repositories::UserRepo;
use entyre_media::MemoryMediaStore;
use serde_json::json;
use sqlx::PgPool;
use tokio::task::JoinSet;

const LOGIN: &str = "/api/v1/auth/login";

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let user = common::create_user(&pool, "alice", "admin").await;
    let app = common::build_test_app(pool.clone());

    // Usernames are matched case-insensitively after trimming.
    let body = json!({ "username": "  Alice ", "password": TEST_PASSWORD });
    let response = post_json(app, LOGIN, body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Login successful");
    assert!(json["token"].is_string());
    assert_eq!(json["expiresIn"], 3600);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "admin");
    assert!(json["user"].get("passwordHash").is_none());

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(stored.last_login_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password_and_unknown_user_look_alike(pool: PgPool) {
    common::create_user(&pool, "bob", "editor").await;
    let app = common::build_test_app(pool);

    let wrong = post_json(
        app.clone(),
        LOGIN,
        json!({ "username": "bob", "password": "not-the-password" }),
    )
    .await;
    let unknown = post_json(
        app,
        LOGIN,
        json!({ "username": "ghost", "password": "not-the-password" }),
    )
    .await;

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong).await, body_json(unknown).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_missing_fields(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, LOGIN, json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["details"],
        json!(["username is required", "password is required"])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_inactive_user(pool: PgPool) {
    let user = common::create_user(&pool, "sleepy", "editor").await;
    UserRepo::set_active(&pool, user.id, false).await.unwrap();
    let app = common::build_test_app(pool);

    let body = json!({ "username": "sleepy", "password": TEST_PASSWORD });
    let response = post_json(app, LOGIN, body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_repeated_failures_lock_out(pool: PgPool) {
    common::create_user(&pool, "carol", "editor").await;
    let app = common::build_test_app(pool);
    let bad = json!({ "username": "carol", "password": "wrong-password" });

    // The test config allows three failures.
    for _ in 0..3 {
        let response = post_json(app.clone(), LOGIN, bad.clone()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Locked out even with the right password.
    let good = json!({ "username": "carol", "password": TEST_PASSWORD });
    let response = post_json(app, LOGIN, good).await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get(RETRY_AFTER)
        .expect("Retry-After header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 300);
    assert_eq!(body_json(response).await["code"], "RATE_LIMITED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rotating_forwarded_for_does_not_escape_lockout(pool: PgPool) {
    common::create_user(&pool, "victim", "editor").await;
    let app = common::build_test_app(pool);
    let bad = json!({ "username": "victim", "password": "wrong-password" });
    let peer: SocketAddr = "203.0.113.20:51000".parse().unwrap();

    let mut statuses = Vec::new();
    for i in 0..6 {
        let forwarded = format!("10.0.0.{i}");
        let response = common::post_json_from(
            app.clone(),
            LOGIN,
            bad.clone(),
            peer,
            &[("x-forwarded-for", forwarded.as_str())],
        )
        .await;
        statuses.push(response.status());
    }

    assert_eq!(&statuses[..3], &[StatusCode::UNAUTHORIZED; 3]);
    assert_eq!(&statuses[3..], &[StatusCode::TOO_MANY_REQUESTS; 3]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_trusted_proxy_forwards_client_address(pool: PgPool) {
    common::create_user(&pool, "erin", "editor").await;
    let mut config = common::test_config();
    config.trusted_proxies = vec!["10.9.0.1".parse().unwrap()];
    let app = common::build_test_app_with_config(
        pool,
        Arc::new(MemoryMediaStore::new()),
        config,
    );
    let bad = json!({ "username": "erin", "password": "wrong-password" });
    let proxy: SocketAddr = "10.9.0.1:443".parse().unwrap();

    for _ in 0..3 {
        let response = common::post_json_from(
            app.clone(),
            LOGIN,
            bad.clone(),
            proxy,
            &[("x-forwarded-for", "198.51.100.1")],
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // The locked-out client stays locked out behind the proxy.
    let response = common::post_json_from(
        app.clone(),
        LOGIN,
        bad.clone(),
        proxy,
        &[("x-forwarded-for", "198.51.100.1")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different client behind the same proxy is tracked separately.
    let good = json!({ "username": "erin", "password": TEST_PASSWORD });
    let response = common::post_json_from(
        app,
        LOGIN,
        good,
        proxy,
        &[("x-forwarded-for", "198.51.100.2")],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_failures_cannot_exceed_limit(pool: PgPool) {
    common::create_user(&pool, "frank", "editor").await;
    let app = common::build_test_app(pool);
    let bad = json!({ "username": "frank", "password": "wrong-password" });

    let mut tasks = JoinSet::new();
    for _ in 0..6 {
        let app = app.clone();
        let bad = bad.clone();
        tasks.spawn(async move { post_json(app, LOGIN, bad).await.status() });
    }
    let statuses = tasks.join_all().await;

    let unauthorized = statuses
        .iter()
        .filter(|s| **s == StatusCode::UNAUTHORIZED)
        .count();
    let limited = statuses
        .iter()
        .filter(|s| **s == StatusCode::TOO_MANY_REQUESTS)
        .count();
    assert_eq!(unauthorized, 3);
    assert_eq!(limited, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_success_resets_failure_count(pool: PgPool) {
    common::create_user(&pool, "dave", "editor").await;
    let app = common::build_test_app(pool);
    let bad = json!({ "username": "dave", "password": "wrong-password" });
    let good = json!({ "username": "dave", "password": TEST_PASSWORD });

    for _ in 0..2 {
        post_json(app.clone(), LOGIN, bad.clone()).await;
    }
    let response = post_json(app.clone(), LOGIN, good.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    for _ in 0..2 {
        post_json(app.clone(), LOGIN, bad.clone()).await;
    }
    let response = post_json(app, LOGIN, good).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Token endpoints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verify_and_me(pool: PgPool) {
    let user = common::create_user(&pool, "erin", "editor").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool.clone());

    let response = get_auth(app.clone(), "/api/v1/auth/verify", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["valid"], true);
    assert_eq!(json["user"]["username"], "erin");

    let response = get_auth(app.clone(), "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["id"], user.id);

    // Deactivated accounts fail verification even with a live token.
    UserRepo::set_active(&pool, user.id, false).await.unwrap();
    let response = get_auth(app, "/api/v1/auth/verify", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_endpoints_require_auth(pool: PgPool) {
    let app = common::build_test_app(pool);

    for uri in ["/api/v1/auth/verify", "/api/v1/auth/me"] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
    let response = get_auth(app, "/api/v1/auth/me", "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout(pool: PgPool) {
    let user = common::create_user(&pool, "frank", "editor").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/v1/auth/logout", json!({}), &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Logout successful");
}

// ---------------------------------------------------------------------------
// Change password
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_password(pool: PgPool) {
    let user = common::create_user(&pool, "grace", "editor").await;
    let token = common::token_for(&user);
    let app = common::build_test_app(pool);
    let uri = "/api/v1/auth/change-password";

    let response = post_json_auth(
        app.clone(),
        uri,
        json!({ "currentPassword": TEST_PASSWORD, "newPassword": "short" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        uri,
        json!({ "currentPassword": "not-it-at-all", "newPassword": "a-new-password" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json_auth(
        app.clone(),
        uri,
        json!({ "currentPassword": TEST_PASSWORD, "newPassword": "a-new-password" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        app,
        LOGIN,
        json!({ "username": "grace", "password": "a-new-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
