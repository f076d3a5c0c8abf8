//! HTTP handlers and the server router
//!
//! ```text
//! POST /PostBack         -> webhook receiver
//! POST /generate-video   -> Veo proxy
//! POST /check-operation  -> Veo proxy
//! GET  /, GET /health    -> status
//! ```

pub mod status;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::veo::proxy::{proxy_router, ProxyState};
use crate::webhook::{webhook_router, RenewalHandler, WebhookState};

pub use status::{health_handler, info_handler, status_router, HealthResponse, ServiceInfo};

/// `{"error": message}` with the given status
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Full server: webhook receiver, Veo proxy endpoints and status routes,
/// behind the given CORS layer.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use vemix_web::config::VertexConfig;
/// use vemix_web::cors::cors_layer_permissive;
/// use vemix_web::handlers::{app_router, ServiceInfo};
/// use vemix_web::veo::ProxyState;
/// use vemix_web::webhook::{CreditPolicy, EventProcessor, LoggingHandler, WebhookState};
///
/// # fn main() -> vemix_web::Result<()> {
/// let processor = EventProcessor::new(Arc::new(LoggingHandler), CreditPolicy::default());
/// let app = app_router(
///     Arc::new(WebhookState::new(processor)),
///     Arc::new(ProxyState::new(VertexConfig::default())?),
///     ServiceInfo::default(),
///     cors_layer_permissive(),
/// );
/// # Ok(())
/// # }
/// ```
pub fn app_router<H: RenewalHandler>(
    webhook: Arc<WebhookState<H>>,
    proxy: Arc<ProxyState>,
    info: ServiceInfo,
    cors: CorsLayer,
) -> Router {
    webhook_router(webhook)
        .merge(proxy_router(proxy))
        .merge(status_router(Arc::new(info)))
        .layer(cors)
}
