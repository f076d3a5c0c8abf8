//! RevenueCat Webhook Receiver
//!
//! HTTP endpoint that accepts RevenueCat deliveries, decodes them with the
//! [`revenuecat`](crate::revenuecat) schema and turns subscription renewals
//! into credit grants.
//!
//! ```text
//! POST /PostBack -> Decode -> [RENEWAL?] -> CreditPolicy -> RenewalHandler
//!                    |            |
//!                    v            v
//!                   400      200 ignored
//! ```
//!
//! Storing credits is the [`RenewalHandler`]'s job. Signature checks,
//! deduplication and retries are not performed here.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vemix_web::webhook::{
//!     webhook_router, CreditGrant, CreditPolicy, EventProcessor, RenewalHandler, WebhookState,
//! };
//!
//! struct CreditStore;
//!
//! #[async_trait::async_trait]
//! impl RenewalHandler for CreditStore {
//!     async fn on_renewal(&self, grant: &CreditGrant) -> anyhow::Result<()> {
//!         // Add grant.credits to grant.app_user_id
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let processor = EventProcessor::new(Arc::new(CreditStore), CreditPolicy::default());
//!     let app = webhook_router(Arc::new(WebhookState::new(processor)));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod handler;
pub mod processor;

pub use handler::{webhook_handler, webhook_router, WebhookState, WEBHOOK_PATH};
pub use processor::{
    CreditGrant, CreditPolicy, EventProcessor, LoggingHandler, NoOpHandler, RenewalHandler,
    WebhookOutcome, WEEKLY_PRODUCT_ID, YEARLY_PRODUCT_ID,
};
