//! Webhook HTTP endpoint
//!
//! Axum handler for RevenueCat deliveries. The body is decoded as raw
//! bytes so decode failures can be answered with a JSON error.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::error::SchemaError;
use crate::handlers::error_response;
use crate::revenuecat::WebhookPayload;
use crate::webhook::processor::{EventProcessor, RenewalHandler, WebhookOutcome};

/// Path RevenueCat is configured to deliver to
pub const WEBHOOK_PATH: &str = "/PostBack";

/// Shared state for the webhook endpoint
pub struct WebhookState<H: RenewalHandler> {
    processor: EventProcessor<H>,
}

impl<H: RenewalHandler> WebhookState<H> {
    /// Create state around a processor
    pub fn new(processor: EventProcessor<H>) -> Self {
        Self { processor }
    }

    /// The wrapped processor
    pub fn processor(&self) -> &EventProcessor<H> {
        &self.processor
    }
}

/// Handle one webhook delivery.
///
/// # Response
/// - `200 OK` with the [`WebhookOutcome`] (unknown event types are ignored)
/// - `400 Bad Request` if the body does not decode
/// - `500 Internal Server Error` if the renewal handler fails
pub async fn webhook_handler<H: RenewalHandler>(
    State(state): State<Arc<WebhookState<H>>>,
    body: Bytes,
) -> Response {
    if body.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No event data provided");
    }

    let payload = match WebhookPayload::from_bytes(&body) {
        Ok(payload) => payload,
        Err(SchemaError::UnknownEventType(event_type)) => {
            tracing::info!(event_type = %event_type, "Ignoring unknown event type");
            return (StatusCode::OK, Json(WebhookOutcome::Ignored { event_type })).into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting malformed webhook payload");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    tracing::info!(
        event_id = %payload.event.id(),
        event_type = %payload.event.event_type(),
        api_version = %payload.api_version,
        "Received RevenueCat webhook"
    );

    match state.processor.process(&payload).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Error processing webhook");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Router with only the webhook endpoint
pub fn webhook_router<H: RenewalHandler>(state: Arc<WebhookState<H>>) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(webhook_handler::<H>))
        .with_state(state)
}
