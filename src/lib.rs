//! Vemix Web - Subscription Webhooks & Veo Proxy Adapter
//!
//! This crate provides the server-side plumbing behind the Vemix video app:
//! typed RevenueCat webhook payloads, a receiver that turns renewals into
//! generation credits, and a client adapter that routes Vertex AI Veo calls
//! through a simplified proxy.
//!
//! # Features
//!
//! - **RevenueCat Schema**: All 18 webhook event types as one tagged union
//! - **Webhook Receiver**: Axum endpoint granting credits on `RENEWAL`
//! - **Veo Adapter**: Reroutes `:predictLongRunning` / `:fetchPredictOperation`
//!   to `/generate-video` / `/check-operation`
//!
//! # Architecture
//!
//! ```text
//! RevenueCat ──▶ POST /PostBack ──▶ WebhookPayload ──▶ EventProcessor ──▶ RenewalHandler
//!
//! App ──▶ VeoClient ──▶ Operation::classify ──▶ Proxy ──▶ Vertex AI
//!                            │
//!                            ▼
//!                 /generate-video, /check-operation, pass-through
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use vemix_web::{EventType, WebhookPayload};
//!
//! let body = r#"{
//!     "api_version": "1.0",
//!     "event": {
//!         "type": "TEMPORARY_ENTITLEMENT_GRANT",
//!         "id": "evt_1",
//!         "app_id": "app_1",
//!         "event_timestamp_ms": 1700000000000,
//!         "app_user_id": "user_1",
//!         "original_app_user_id": "user_1",
//!         "aliases": ["user_1"],
//!         "subscriber_attributes": {}
//!     }
//! }"#;
//!
//! let payload: WebhookPayload = body.parse().unwrap();
//! assert_eq!(payload.event.event_type(), EventType::TemporaryEntitlementGrant);
//! assert!(!payload.event.is_renewal());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod revenuecat;
pub mod veo;
pub mod webhook;

// Re-exports for convenience
pub use config::{ProxyConfig, VertexConfig, WebhookConfig};
pub use error::{Error, Result};
pub use revenuecat::{Event, EventKind, EventType, WebhookPayload};
pub use veo::{VeoClient, VeoModel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
