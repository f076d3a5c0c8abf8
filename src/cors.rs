//! CORS configuration for the webhook receiver
//!
//! The receiver is called server-to-server by RevenueCat and from browser
//! dashboards during development, so the default layer allows any origin.
//! A localhost-only layer is available for locked-down deployments
//! (`vemix-web serve --strict-cors`).
//!
//! # Example
//!
//! ```rust
//! use axum::routing::get;
//! use axum::Router;
//! use vemix_web::cors::cors_layer;
//!
//! let app: Router = Router::new()
//!     .route("/health", get(|| async { "ok" }))
//!     .layer(cors_layer());
//! ```

use std::time::Duration;

use http::{header::HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Allowed request headers
pub const ALLOWED_HEADERS: [http::header::HeaderName; 2] =
    [http::header::CONTENT_TYPE, http::header::AUTHORIZATION];

/// Allowed methods
pub const ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

/// Default max age for preflight cache (1 hour)
pub const DEFAULT_MAX_AGE_SECS: u64 = 3600;

/// CORS layer that only allows localhost origins.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin, _| {
            is_localhost_origin(origin)
        }))
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(ALLOWED_HEADERS)
        .max_age(Duration::from_secs(DEFAULT_MAX_AGE_SECS))
}

/// CORS layer that allows every origin, method and header.
pub fn cors_layer_permissive() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(DEFAULT_MAX_AGE_SECS))
}

/// Checks if the given origin is a localhost origin.
///
/// Accepts `http(s)://localhost`, `http(s)://127.0.0.1` and `http(s)://[::1]`,
/// each with an optional non-zero port.
///
/// ```rust
/// use http::header::HeaderValue;
/// use vemix_web::cors::is_localhost_origin;
///
/// assert!(is_localhost_origin(&HeaderValue::from_static("http://localhost:3000")));
/// assert!(!is_localhost_origin(&HeaderValue::from_static("http://localhost.evil.com")));
/// ```
pub fn is_localhost_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let origin = origin.to_lowercase();

    let Some(rest) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };

    ["localhost", "127.0.0.1", "[::1]"]
        .iter()
        .filter_map(|host| rest.strip_prefix(host))
        .any(valid_port_suffix)
}

// Empty, or `:PORT` with a non-zero port.
fn valid_port_suffix(suffix: &str) -> bool {
    match suffix.strip_prefix(':') {
        None => suffix.is_empty(),
        Some(port) => port.parse::<u16>().map(|p| p > 0).unwrap_or(false),
    }
}
