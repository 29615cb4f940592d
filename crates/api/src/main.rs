use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use entyre_core::roles::ROLE_ADMIN;
use entyre_db::models::user::CreateUser;
use entyre_db::repositories::UserRepo;
use entyre_db::DbPool;
use entyre_media::{CloudinaryConfig, CloudinaryStore, MediaStore, UnconfiguredMediaStore};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use entyre_api::auth::password::{hash_password, validate_password_strength};
use entyre_api::background;
use entyre_api::config::ServerConfig;
use entyre_api::router::build_app_router;
use entyre_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "entyre_api=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = entyre_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    entyre_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    entyre_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    if let Err(e) = bootstrap_admin(&pool).await {
        tracing::error!(error = %format!("{e:#}"), "Admin bootstrap failed");
    }

    // --- Media storage ---
    let media: Arc<dyn MediaStore> = match CloudinaryConfig::from_env() {
        Some(cloudinary) => {
            tracing::info!(cloud_name = %cloudinary.cloud_name, "Media storage configured");
            Arc::new(CloudinaryStore::new(cloudinary))
        }
        None => {
            tracing::warn!("Media storage credentials missing; uploads will fail with 502");
            Arc::new(UnconfiguredMediaStore)
        }
    };

    // --- App state ---
    let state = AppState::new(pool, config.clone(), media);

    // --- Background tasks ---
    let cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(background::login_attempt_sweep::run(
        Arc::clone(&state.login_attempts),
        Duration::from_secs(config.login.sweep_interval_secs),
        cancel.clone(),
    ));

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Connection info feeds the login limiter's client key.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, sweep_handle).await.is_err() {
        tracing::warn!("Login attempt sweep did not stop within the shutdown timeout");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Create the admin named by `ADMIN_USERNAME` / `ADMIN_PASSWORD` if it does
/// not exist yet. Does nothing when either variable is unset.
async fn bootstrap_admin(pool: &DbPool) -> anyhow::Result<()> {
    let (Ok(username), Ok(password)) = (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        return Ok(());
    };

    let username = username.trim().to_lowercase();
    if username.is_empty() {
        anyhow::bail!("ADMIN_USERNAME must not be blank");
    }
    validate_password_strength(&password).map_err(anyhow::Error::msg)?;

    if UserRepo::find_by_username(pool, &username)
        .await
        .context("looking up admin user")?
        .is_some()
    {
        tracing::debug!(%username, "Admin user already exists");
        return Ok(());
    }

    let password_hash = hash_password(&password).map_err(|e| anyhow::anyhow!("{e}"))?;
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username,
            password_hash,
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await
    .context("creating admin user")?;

    tracing::info!(user_id = user.id, username = %user.username, "Admin user created");
    Ok(())
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
