use std::net::IpAddr;

use entyre_core::login_limiter::{
    DEFAULT_LOCKOUT_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_TRACKED_KEYS,
};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Reverse proxies whose `X-Forwarded-For` header is believed.
    pub trusted_proxies: Vec<IpAddr>,
    pub request_timeout_secs: u64,
    /// Grace period for background tasks after the server stops accepting
    /// connections.
    pub shutdown_timeout_secs: u64,
    /// Request body limit, which also caps uploaded files.
    pub max_upload_bytes: usize,
    pub jwt: JwtConfig,
    pub login: LoginLimitConfig,
}

/// Failed-login limiter settings.
#[derive(Debug, Clone)]
pub struct LoginLimitConfig {
    pub max_attempts: u32,
    pub lockout_secs: i64,
    pub max_tracked_keys: usize,
    pub sweep_interval_secs: u64,
}

impl Default for LoginLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lockout_secs: DEFAULT_LOCKOUT_SECS,
            max_tracked_keys: DEFAULT_MAX_TRACKED_KEYS,
            sweep_interval_secs: 60,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// | Env Var                     | Default                                        |
    /// |-----------------------------|------------------------------------------------|
    /// | `HOST`                      | `0.0.0.0`                                      |
    /// | `PORT`                      | `3001`                                         |
    /// | `CORS_ORIGINS`              | `http://localhost:3000,http://localhost:5173`  |
    /// | `TRUSTED_PROXIES`           | (none)                                         |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                                           |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `10`                                           |
    /// | `MAX_UPLOAD_BYTES`          | `10485760`                                     |
    /// | `LOGIN_MAX_ATTEMPTS`        | `5`                                            |
    /// | `LOGIN_LOCKOUT_SECS`        | `300`                                          |
    /// | `LOGIN_MAX_TRACKED_KEYS`    | `10000`                                        |
    /// | `LOGIN_SWEEP_INTERVAL_SECS` | `60`                                           |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable is set but does not parse.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", "3001")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> =
            env_or("CORS_ORIGINS", "http://localhost:3000,http://localhost:5173")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

        let trusted_proxies: Vec<IpAddr> = env_or("TRUSTED_PROXIES", "")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .expect("TRUSTED_PROXIES must be a comma-separated list of IP addresses")
            })
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", "10")
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = env_or("MAX_UPLOAD_BYTES", "10485760")
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let defaults = LoginLimitConfig::default();
        let login = LoginLimitConfig {
            max_attempts: env_or("LOGIN_MAX_ATTEMPTS", &defaults.max_attempts.to_string())
                .parse()
                .expect("LOGIN_MAX_ATTEMPTS must be a valid u32"),
            lockout_secs: env_or("LOGIN_LOCKOUT_SECS", &defaults.lockout_secs.to_string())
                .parse()
                .expect("LOGIN_LOCKOUT_SECS must be a valid i64"),
            max_tracked_keys: env_or(
                "LOGIN_MAX_TRACKED_KEYS",
                &defaults.max_tracked_keys.to_string(),
            )
            .parse()
            .expect("LOGIN_MAX_TRACKED_KEYS must be a valid usize"),
            sweep_interval_secs: env_or(
                "LOGIN_SWEEP_INTERVAL_SECS",
                &defaults.sweep_interval_secs.to_string(),
            )
            .parse()
            .expect("LOGIN_SWEEP_INTERVAL_SECS must be a valid u64"),
        };

        Self {
            host,
            port,
            cors_origins,
            trusted_proxies,
            request_timeout_secs,
            shutdown_timeout_secs,
            max_upload_bytes,
            jwt: JwtConfig::from_env(),
            login,
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
