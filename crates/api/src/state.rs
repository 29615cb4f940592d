use std::sync::Arc;

use entyre_core::login_limiter::LoginAttemptTracker;
use entyre_media::MediaStore;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: entyre_db::DbPool,
    /// Server configuration (wrapped in Arc for cheap cloning).
    pub config: Arc<ServerConfig>,
    /// Remote storage for uploaded images and spreadsheets.
    pub media: Arc<dyn MediaStore>,
    /// Failed-login tracker, shared with the sweep task.
    pub login_attempts: Arc<Mutex<LoginAttemptTracker>>,
}

impl AppState {
    pub fn new(pool: entyre_db::DbPool, config: ServerConfig, media: Arc<dyn MediaStore>) -> Self {
        let tracker = LoginAttemptTracker::new(
            config.login.max_attempts,
            chrono::Duration::seconds(config.login.lockout_secs),
            config.login.max_tracked_keys,
        );
        Self {
            pool,
            config: Arc::new(config),
            media,
            login_attempts: Arc::new(Mutex::new(tracker)),
        }
    }
}
