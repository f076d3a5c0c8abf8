//! RevenueCat Webhook Schema
//!
//! Typed shapes for the subscription-lifecycle events RevenueCat delivers
//! to a webhook endpoint. The payload wrapper carries the event and the API
//! version that rendered it:
//!
//! ```text
//! { "api_version": "1.0", "event": { "type": "RENEWAL", "id": ..., ... } }
//!                                     |
//!                                     v
//!                  Event { base: EventBase, kind: EventKind::Renewal(..) }
//! ```
//!
//! Decoding is the only validation performed: a payload is accepted when
//! its `type` tag names exactly one [`EventKind`] variant and every field
//! that variant requires is present with the right primitive type.
//!
//! # Example
//!
//! ```rust
//! use vemix_web::revenuecat::{EventType, WebhookPayload};
//!
//! let body = r#"{
//!     "api_version": "1.0",
//!     "event": {
//!         "type": "TEMPORARY_ENTITLEMENT_GRANT",
//!         "id": "evt_1",
//!         "app_id": "app_1",
//!         "app_user_id": "user_1",
//!         "event_timestamp_ms": 1754692278482
//!     }
//! }"#;
//!
//! let payload: WebhookPayload = body.parse()?;
//! assert_eq!(payload.event.event_type(), EventType::TemporaryEntitlementGrant);
//! assert!(!payload.event.is_renewal());
//! # Ok::<(), vemix_web::error::SchemaError>(())
//! ```

// Field-level docs live in RevenueCat's webhook reference
#![allow(missing_docs)]

pub mod events;

pub use events::{
    BillingIssueDetails, CancellationDetails, Environment, Event, EventBase, EventKind,
    EventType, ExpirationDetails, InvoiceIssuanceDetails, Null, PeriodType, ProductChangeDetails,
    PurchaseFields, RefundDetails, Store, SubscriberAttribute, SubscriberAttributes,
    SubscriptionExtendedDetails, SubscriptionPausedDetails, TransferDetails, VirtualCurrency,
    VirtualCurrencyAdjustment, VirtualCurrencyTransactionDetails, WebhookPayload,
};
