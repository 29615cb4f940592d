//! JWT access-token generation and validation.
//!
//! Tokens are HS256-signed and stateless: logout is acknowledged by the
//! client discarding its token. Issuer and audience are checked on every
//! decode so tokens minted for another service are rejected.

use entyre_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    pub username: String,
    /// The user's role name (`"admin"` or `"editor"`).
    pub role: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Unique token identifier (UUID v4) for audit logs.
    pub jti: String,
    pub iss: String,
    pub aud: String,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in hours (default: 24).
    pub expiry_hours: i64,
    pub issuer: String,
    pub audience: String,
}

const DEFAULT_EXPIRY_HOURS: i64 = 24;
const DEFAULT_ISSUER: &str = "entyre-cms";
const DEFAULT_AUDIENCE: &str = "entyre-users";

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var            | Required | Default        |
    /// |--------------------|----------|----------------|
    /// | `JWT_SECRET`       | **yes**  | --             |
    /// | `JWT_EXPIRY_HOURS` | no       | `24`           |
    /// | `JWT_ISSUER`       | no       | `entyre-cms`   |
    /// | `JWT_AUDIENCE`     | no       | `entyre-users` |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let expiry_hours: i64 = std::env::var("JWT_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_EXPIRY_HOURS.to_string())
            .parse()
            .expect("JWT_EXPIRY_HOURS must be a valid i64");

        Self {
            secret,
            expiry_hours,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| DEFAULT_AUDIENCE.into()),
        }
    }

    /// Token lifetime in seconds, as reported to clients in `expiresIn`.
    pub fn expiry_secs(&self) -> i64 {
        self.expiry_hours * 3600
    }
}

/// Generate an HS256 access token for the given user.
pub fn generate_access_token(
    user_id: DbId,
    username: &str,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + config.expiry_secs(),
        jti: Uuid::new_v4().to_string(),
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Checks the signature, expiration, issuer, and audience.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_hours: 24,
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = test_config();
        let token = generate_access_token(42, "alice", "editor", &config).unwrap();
        let claims = validate_token(&token, &config).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "editor");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.iss, "entyre-cms");
        assert_eq!(claims.aud, "entyre-users");
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_access_token(1, "alice", "admin", &test_config()).unwrap();
        let mut other = test_config();
        other.secret = "a-completely-different-secret-value".to_string();
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn test_foreign_audience_is_rejected() {
        let token = generate_access_token(1, "alice", "admin", &test_config()).unwrap();
        let mut other = test_config();
        other.audience = "someone-else".to_string();
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut config = test_config();
        // Past the default 60 s leeway.
        config.expiry_hours = -1;
        let token = generate_access_token(1, "alice", "admin", &config).unwrap();
        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn test_each_token_has_unique_jti() {
        let config = test_config();
        let a = validate_token(&generate_access_token(1, "a", "admin", &config).unwrap(), &config)
            .unwrap();
        let b = validate_token(&generate_access_token(1, "a", "admin", &config).unwrap(), &config)
            .unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
