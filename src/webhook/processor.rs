//! Webhook Event Processing
//!
//! Classifies a decoded webhook and, for subscription renewals, works out
//! how many generation credits the renewed product is worth before handing
//! the grant to a [`RenewalHandler`].
//!
//! ```text
//! WebhookPayload
//!       |
//!       v
//! [RENEWAL?] --no--> Ignored { event_type }
//!       |
//!       v
//! [CreditPolicy lookup] --unknown product--> Processed { credits_granted: 0 }
//!       |
//!       v
//! [RenewalHandler::on_renewal] --> Processed { credits_granted: n }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WebhookError;
use crate::revenuecat::{Environment, WebhookPayload};

/// Weekly subscription product
pub const WEEKLY_PRODUCT_ID: &str = "com.vemix.weekly";

/// Yearly subscription product
pub const YEARLY_PRODUCT_ID: &str = "com.vemix.yearly";

/// Credits granted per product renewal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditPolicy {
    grants: HashMap<String, u32>,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self::empty()
            .with_grant(WEEKLY_PRODUCT_ID, 10)
            .with_grant(YEARLY_PRODUCT_ID, 60)
    }
}

impl CreditPolicy {
    /// Policy that grants nothing for any product
    pub fn empty() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    /// Add or replace the grant for a product
    pub fn with_grant(mut self, product_id: impl Into<String>, credits: u32) -> Self {
        self.grants.insert(product_id.into(), credits);
        self
    }

    /// Credits for renewing `product_id`, `None` for unknown products
    pub fn credits_for(&self, product_id: &str) -> Option<u32> {
        self.grants.get(product_id).copied()
    }
}

/// A credit grant produced by a renewal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditGrant {
    /// Id of the renewal event
    pub event_id: String,
    /// Subscriber to credit
    pub app_user_id: String,
    /// Renewed product
    pub product_id: String,
    /// Credits to add
    pub credits: u32,
    /// Store environment the renewal happened in
    pub environment: Environment,
    /// Renewal count from the event, when RevenueCat sends one
    pub renewal_number: Option<u32>,
}

/// Result of processing one webhook delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// Event type we do not act on
    Ignored {
        /// Wire tag of the ignored event
        event_type: String,
    },
    /// Renewal handled
    Processed {
        /// Id of the processed event
        event_id: String,
        /// Credits granted (zero for unknown products)
        credits_granted: u32,
    },
}

/// Handler trait for renewal credit grants
#[async_trait::async_trait]
pub trait RenewalHandler: Send + Sync + 'static {
    /// Apply a credit grant for a renewed subscription
    async fn on_renewal(&self, grant: &CreditGrant) -> anyhow::Result<()>;
}

/// Turns webhook payloads into outcomes
pub struct EventProcessor<H: RenewalHandler> {
    handler: Arc<H>,
    policy: CreditPolicy,
}

impl<H: RenewalHandler> EventProcessor<H> {
    /// Create a new event processor
    pub fn new(handler: Arc<H>, policy: CreditPolicy) -> Self {
        Self { handler, policy }
    }

    /// Credit policy in use
    pub fn policy(&self) -> &CreditPolicy {
        &self.policy
    }

    /// Process one decoded payload
    pub async fn process(&self, payload: &WebhookPayload) -> Result<WebhookOutcome, WebhookError> {
        let event = &payload.event;

        let Some(renewal) = event.as_renewal() else {
            tracing::info!(
                event_id = %event.id(),
                event_type = %event.event_type(),
                "Ignoring non-renewal event"
            );
            return Ok(WebhookOutcome::Ignored {
                event_type: event.event_type().as_str().to_string(),
            });
        };

        let Some(credits) = self.policy.credits_for(&renewal.product_id) else {
            tracing::warn!(
                event_id = %event.id(),
                product_id = %renewal.product_id,
                "Unknown product id; no credits granted"
            );
            return Ok(WebhookOutcome::Processed {
                event_id: event.id().to_string(),
                credits_granted: 0,
            });
        };

        let grant = CreditGrant {
            event_id: event.id().to_string(),
            app_user_id: event.base.app_user_id.clone(),
            product_id: renewal.product_id.clone(),
            credits,
            environment: renewal.environment,
            renewal_number: renewal.renewal_number,
        };

        self.handler.on_renewal(&grant).await.map_err(|e| {
            tracing::error!(
                event_id = %grant.event_id,
                app_user_id = %grant.app_user_id,
                error = %e,
                "Renewal handler failed"
            );
            WebhookError::ProcessingFailed(e.to_string())
        })?;

        tracing::info!(
            event_id = %grant.event_id,
            app_user_id = %grant.app_user_id,
            product_id = %grant.product_id,
            credits,
            "Renewal processed"
        );

        Ok(WebhookOutcome::Processed {
            event_id: grant.event_id,
            credits_granted: credits,
        })
    }
}

/// No-op handler for testing
#[derive(Clone)]
pub struct NoOpHandler;

#[async_trait::async_trait]
impl RenewalHandler for NoOpHandler {
    async fn on_renewal(&self, _grant: &CreditGrant) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Logging handler that logs every grant
#[derive(Clone)]
pub struct LoggingHandler;

#[async_trait::async_trait]
impl RenewalHandler for LoggingHandler {
    async fn on_renewal(&self, grant: &CreditGrant) -> anyhow::Result<()> {
        tracing::info!(
            app_user_id = %grant.app_user_id,
            product_id = %grant.product_id,
            credits = grant.credits,
            environment = ?grant.environment,
            renewal_number = ?grant.renewal_number,
            "Credits granted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Test handler that tracks calls
    struct TestHandler {
        calls: AtomicU32,
        credits: AtomicU32,
        should_fail: AtomicBool,
    }

    impl TestHandler {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
                credits: AtomicU32::new(0),
                should_fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait::async_trait]
    impl RenewalHandler for TestHandler {
        async fn on_renewal(&self, grant: &CreditGrant) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.should_fail.load(Ordering::SeqCst) {
                anyhow::bail!("Simulated failure");
            }
            self.credits.fetch_add(grant.credits, Ordering::SeqCst);
            Ok(())
        }
    }

    fn payload(event_type: &str, product_id: &str) -> WebhookPayload {
        let json = format!(
            r#"{{
                "api_version": "1.0",
                "event": {{
                    "type": "{event_type}",
                    "id": "evt_test_123",
                    "app_id": "app_test",
                    "app_user_id": "2b7c9a3e-5d1f-4f8e-9c6a-1e2d3c4b5a69",
                    "event_timestamp_ms": 1754692278482,
                    "product_id": "{product_id}",
                    "period_type": "NORMAL",
                    "purchased_at_ms": 1754687476000,
                    "environment": "SANDBOX",
                    "transaction_id": "tx_2",
                    "original_transaction_id": "tx_1",
                    "is_family_share": false,
                    "renewal_number": 3
                }}
            }}"#
        );
        WebhookPayload::from_bytes(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_default_policy() {
        let policy = CreditPolicy::default();
        assert_eq!(policy.credits_for(WEEKLY_PRODUCT_ID), Some(10));
        assert_eq!(policy.credits_for(YEARLY_PRODUCT_ID), Some(60));
        assert_eq!(policy.credits_for("com.vemix.monthly"), None);
    }

    #[tokio::test]
    async fn test_renewal_grants_credits() {
        let handler = Arc::new(TestHandler::new());
        let processor = EventProcessor::new(handler.clone(), CreditPolicy::default());

        let outcome = processor
            .process(&payload("RENEWAL", YEARLY_PRODUCT_ID))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Processed {
                event_id: "evt_test_123".to_string(),
                credits_granted: 60,
            }
        );
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
        assert_eq!(handler.credits.load(Ordering::SeqCst), 60);
    }

    #[tokio::test]
    async fn test_non_renewal_ignored() {
        let handler = Arc::new(TestHandler::new());
        let processor = EventProcessor::new(handler.clone(), CreditPolicy::default());

        let outcome = processor
            .process(&payload("INITIAL_PURCHASE", WEEKLY_PRODUCT_ID))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Ignored {
                event_type: "INITIAL_PURCHASE".to_string()
            }
        );
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_skips_handler() {
        let handler = Arc::new(TestHandler::new());
        let processor = EventProcessor::new(handler.clone(), CreditPolicy::default());

        let outcome = processor
            .process(&payload("RENEWAL", "com.vemix.lifetime"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Processed {
                event_id: "evt_test_123".to_string(),
                credits_granted: 0,
            }
        );
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_failure_surfaces() {
        let handler = Arc::new(TestHandler::new());
        handler.should_fail.store(true, Ordering::SeqCst);
        let processor = EventProcessor::new(handler.clone(), CreditPolicy::default());

        let err = processor
            .process(&payload("RENEWAL", WEEKLY_PRODUCT_ID))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::ProcessingFailed(_)));
        assert!(err.to_string().contains("Simulated failure"));
    }

    #[test]
    fn test_outcome_serialization() {
        let ignored = WebhookOutcome::Ignored {
            event_type: "EXPIRATION".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&ignored).unwrap(),
            serde_json::json!({"status": "ignored", "event_type": "EXPIRATION"})
        );

        let processed = WebhookOutcome::Processed {
            event_id: "evt_1".to_string(),
            credits_granted: 10,
        };
        assert_eq!(
            serde_json::to_value(&processed).unwrap(),
            serde_json::json!({"status": "processed", "event_id": "evt_1", "credits_granted": 10})
        );
    }
}
