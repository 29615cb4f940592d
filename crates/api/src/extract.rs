//! Request extractors that reject with the standard JSON error body.
//!
//! Axum's built-in `Json` and `Path` reject with plain-text bodies; these
//! wrappers turn the same failures into [`AppError`]s.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use entyre_core::error::CoreError;
use entyre_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor. Malformed or oversized bodies become 400/413 errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(AppJson(value)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                Err(AppError::PayloadTooLarge(rejection.body_text()))
            }
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// A positive database id taken from the single `{id}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub DbId);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        parse_id(&raw).map(IdPath).map_err(AppError::Core)
    }
}

/// Parse a path identifier. Only positive integers name a row.
pub fn parse_id(raw: &str) -> Result<DbId, CoreError> {
    match raw.trim().parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CoreError::InvalidIdentifier(format!(
            "'{raw}' is not a valid id"
        ))),
    }
}

/// Client address used to key the login limiter.
///
/// This is the socket peer. `X-Forwarded-For` is only consulted when the
/// peer is listed in `TRUSTED_PROXIES`; the chain is then walked from the
/// right and the first hop that is not itself a trusted proxy wins.
/// Without connection info (in-process tests) every request maps to
/// `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok());
        Ok(ClientIp(resolve_client_ip(
            peer,
            forwarded,
            &state.config.trusted_proxies,
        )))
    }
}

/// Pick the client address from the socket peer and, behind a trusted
/// proxy, the forwarded chain. An unparseable hop ends the walk.
pub fn resolve_client_ip(
    peer: Option<IpAddr>,
    forwarded: Option<&str>,
    trusted_proxies: &[IpAddr],
) -> String {
    let Some(peer) = peer else {
        return "unknown".to_string();
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let mut client = peer;
    for hop in forwarded.unwrap_or_default().rsplit(',') {
        let Ok(ip) = hop.trim().parse::<IpAddr>() else {
            break;
        };
        client = ip;
        if !trusted_proxies.contains(&ip) {
            break;
        }
    }
    client.to_string()
}

/// Map a multipart read failure, keeping the body-limit case distinct.
pub fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_parse_id_accepts_positive_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id(" 7 ").unwrap(), 7);
    }

    #[test]
    fn test_parse_id_rejects_other_shapes() {
        for raw in ["0", "-3", "abc", "", "1.5", "64f1c0ffee"] {
            assert_matches!(parse_id(raw), Err(CoreError::InvalidIdentifier(_)), "{raw}");
        }
    }

    fn ip(raw: &str) -> IpAddr {
        raw.parse().unwrap()
    }

    #[test]
    fn test_forwarded_header_ignored_from_untrusted_peer() {
        let resolved = resolve_client_ip(Some(ip("203.0.113.9")), Some("10.0.0.1"), &[]);
        assert_eq!(resolved, "203.0.113.9");
    }

    #[test]
    fn test_missing_peer_is_unknown() {
        assert_eq!(resolve_client_ip(None, Some("10.0.0.1"), &[]), "unknown");
    }

    #[test]
    fn test_trusted_proxy_chain_yields_nearest_untrusted_hop() {
        let proxies = [ip("10.1.0.1"), ip("10.1.0.2")];
        // The left-most entry is client-controlled and must not win.
        let resolved = resolve_client_ip(
            Some(ip("10.1.0.2")),
            Some("1.2.3.4, 198.51.100.7, 10.1.0.1"),
            &proxies,
        );
        assert_eq!(resolved, "198.51.100.7");
    }

    #[test]
    fn test_trusted_proxy_with_garbage_header_falls_back() {
        let proxies = [ip("10.1.0.1")];
        let resolved = resolve_client_ip(Some(ip("10.1.0.1")), Some("not-an-ip"), &proxies);
        assert_eq!(resolved, "10.1.0.1");
        let resolved = resolve_client_ip(Some(ip("10.1.0.1")), None, &proxies);
        assert_eq!(resolved, "10.1.0.1");
    }
}
