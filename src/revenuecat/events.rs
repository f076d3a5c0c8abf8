//! RevenueCat Event Types
//!
//! Strongly-typed representations of RevenueCat webhook events (API v1.0).
//! Every event is a shared [`EventBase`] plus one [`EventKind`] variant,
//! selected by the `type` tag on the wire.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::SchemaError;

/// Store the purchase was made through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Store {
    AppStore,
    PlayStore,
    Stripe,
    Amazon,
    MacAppStore,
    Promotional,
    RcBilling,
}

/// Purchase environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    Production,
    Sandbox,
}

/// Subscription period type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    Normal,
    Trial,
    Intro,
    Grace,
}

/// Event type tags we accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    InitialPurchase,
    Renewal,
    Cancellation,
    Uncancellation,
    NonRenewingPurchase,
    SubscriptionPaused,
    Expiration,
    ProductChange,
    BillingIssue,
    Refund,
    RefundReversed,
    Transfer,
    SubscriptionExtended,
    TrialStarted,
    TrialCancelled,
    InvoiceIssuance,
    TemporaryEntitlementGrant,
    VirtualCurrencyTransaction,
}

impl EventType {
    /// Every event type, in declaration order
    pub const ALL: [EventType; 18] = [
        Self::InitialPurchase,
        Self::Renewal,
        Self::Cancellation,
        Self::Uncancellation,
        Self::NonRenewingPurchase,
        Self::SubscriptionPaused,
        Self::Expiration,
        Self::ProductChange,
        Self::BillingIssue,
        Self::Refund,
        Self::RefundReversed,
        Self::Transfer,
        Self::SubscriptionExtended,
        Self::TrialStarted,
        Self::TrialCancelled,
        Self::InvoiceIssuance,
        Self::TemporaryEntitlementGrant,
        Self::VirtualCurrencyTransaction,
    ];

    /// Get the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialPurchase => "INITIAL_PURCHASE",
            Self::Renewal => "RENEWAL",
            Self::Cancellation => "CANCELLATION",
            Self::Uncancellation => "UNCANCELLATION",
            Self::NonRenewingPurchase => "NON_RENEWING_PURCHASE",
            Self::SubscriptionPaused => "SUBSCRIPTION_PAUSED",
            Self::Expiration => "EXPIRATION",
            Self::ProductChange => "PRODUCT_CHANGE",
            Self::BillingIssue => "BILLING_ISSUE",
            Self::Refund => "REFUND",
            Self::RefundReversed => "REFUND_REVERSED",
            Self::Transfer => "TRANSFER",
            Self::SubscriptionExtended => "SUBSCRIPTION_EXTENDED",
            Self::TrialStarted => "TRIAL_STARTED",
            Self::TrialCancelled => "TRIAL_CANCELLED",
            Self::InvoiceIssuance => "INVOICE_ISSUANCE",
            Self::TemporaryEntitlementGrant => "TEMPORARY_ENTITLEMENT_GRANT",
            Self::VirtualCurrencyTransaction => "VIRTUAL_CURRENCY_TRANSACTION",
        }
    }
}

impl FromStr for EventType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownEventType(s.to_string()))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One custom attribute set on the subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriberAttribute {
    pub value: String,
    pub updated_at_ms: i64,
}

/// Subscriber attributes keyed by attribute name (e.g. `$email`)
pub type SubscriberAttributes = HashMap<String, SubscriberAttribute>;

/// Fields shared by every event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBase {
    /// Unique event identifier
    pub id: String,
    pub app_id: String,
    pub app_user_id: String,
    /// When the event fired (Unix milliseconds)
    pub event_timestamp_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_app_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_attributes: Option<SubscriberAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<Store>,
}

/// Purchase fields carried by most subscription events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseFields {
    pub product_id: String,
    pub period_type: PeriodType,
    pub purchased_at_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_at_ms: Option<i64>,
    pub environment: Environment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entitlement_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entitlement_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presented_offering_id: Option<String>,
    pub transaction_id: String,
    pub original_transaction_id: String,
    pub is_family_share: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_trial_conversion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Price in USD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_in_purchased_currency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub takehome_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationDetails {
    #[serde(flatten)]
    pub purchase: PurchaseFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPausedDetails {
    #[serde(flatten)]
    pub purchase: PurchaseFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_resume_at_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationDetails {
    #[serde(flatten)]
    pub purchase: PurchaseFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductChangeDetails {
    #[serde(flatten)]
    pub purchase: PurchaseFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_product_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingIssueDetails {
    #[serde(flatten)]
    pub purchase: PurchaseFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period_expiration_at_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundDetails {
    #[serde(flatten)]
    pub purchase: PurchaseFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionExtendedDetails {
    #[serde(flatten)]
    pub purchase: PurchaseFields,
    pub new_expiration_at_ms: i64,
}

/// Transfer of purchases between app user ids. Carries no purchase block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transferred_from: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transferred_to: Option<Vec<String>>,
}

/// A field that must be present and `null`.
///
/// Deserializes only from a JSON `null`. An absent key, an empty object or
/// any other value is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Null;

impl Serialize for Null {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

impl<'de> Deserialize<'de> for Null {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `deserialize_unit` on buffered content also accepts `{}`.
        deserializer.deserialize_any(NullVisitor)
    }
}

struct NullVisitor;

impl<'de> Visitor<'de> for NullVisitor {
    type Value = Null;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Null, E> {
        Ok(Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Null, E> {
        Ok(Null)
    }
}

/// Invoice issuance (RevenueCat Billing).
///
/// RevenueCat documents the [`Null`]-typed fields as always present and
/// always `null` for this event; they accept nothing but `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceIssuanceDetails {
    pub product_id: String,
    pub period_type: Null,
    pub purchased_at_ms: i64,
    pub expiration_at_ms: Null,
    pub environment: Environment,
    pub entitlement_id: Null,
    pub entitlement_ids: Null,
    pub presented_offering_id: Null,
    pub transaction_id: Null,
    pub original_transaction_id: Null,
    pub is_family_share: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_in_purchased_currency: Option<f64>,
    pub takehome_percentage: Null,
    pub offer_code: Null,
    pub tax_percentage: Null,
    pub commission_percentage: Null,
    pub metadata: Null,
    pub renewal_number: Null,
}

/// Currency referenced by a virtual currency adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualCurrency {
    pub code: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualCurrencyAdjustment {
    pub amount: i64,
    pub currency: VirtualCurrency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualCurrencyTransactionDetails {
    pub adjustments: Vec<VirtualCurrencyAdjustment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_display_name: Option<String>,
    pub product_id: String,
    pub purchase_environment: Environment,
    pub source: String,
    pub transaction_id: String,
    pub virtual_currency_transaction_id: String,
}

/// Variant-specific payload, selected by the `type` tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    InitialPurchase(PurchaseFields),
    Renewal(PurchaseFields),
    Cancellation(CancellationDetails),
    Uncancellation(PurchaseFields),
    NonRenewingPurchase(PurchaseFields),
    SubscriptionPaused(SubscriptionPausedDetails),
    Expiration(ExpirationDetails),
    ProductChange(ProductChangeDetails),
    BillingIssue(BillingIssueDetails),
    Refund(RefundDetails),
    RefundReversed(PurchaseFields),
    Transfer(TransferDetails),
    SubscriptionExtended(SubscriptionExtendedDetails),
    TrialStarted(PurchaseFields),
    TrialCancelled(PurchaseFields),
    InvoiceIssuance(InvoiceIssuanceDetails),
    TemporaryEntitlementGrant,
    VirtualCurrencyTransaction(VirtualCurrencyTransactionDetails),
}

impl EventKind {
    /// Discriminant of this variant
    pub fn event_type(&self) -> EventType {
        match self {
            Self::InitialPurchase(_) => EventType::InitialPurchase,
            Self::Renewal(_) => EventType::Renewal,
            Self::Cancellation(_) => EventType::Cancellation,
            Self::Uncancellation(_) => EventType::Uncancellation,
            Self::NonRenewingPurchase(_) => EventType::NonRenewingPurchase,
            Self::SubscriptionPaused(_) => EventType::SubscriptionPaused,
            Self::Expiration(_) => EventType::Expiration,
            Self::ProductChange(_) => EventType::ProductChange,
            Self::BillingIssue(_) => EventType::BillingIssue,
            Self::Refund(_) => EventType::Refund,
            Self::RefundReversed(_) => EventType::RefundReversed,
            Self::Transfer(_) => EventType::Transfer,
            Self::SubscriptionExtended(_) => EventType::SubscriptionExtended,
            Self::TrialStarted(_) => EventType::TrialStarted,
            Self::TrialCancelled(_) => EventType::TrialCancelled,
            Self::InvoiceIssuance(_) => EventType::InvoiceIssuance,
            Self::TemporaryEntitlementGrant => EventType::TemporaryEntitlementGrant,
            Self::VirtualCurrencyTransaction(_) => EventType::VirtualCurrencyTransaction,
        }
    }

    /// Purchase block, for the variants that carry one
    pub fn purchase(&self) -> Option<&PurchaseFields> {
        match self {
            Self::InitialPurchase(p)
            | Self::Renewal(p)
            | Self::Uncancellation(p)
            | Self::NonRenewingPurchase(p)
            | Self::RefundReversed(p)
            | Self::TrialStarted(p)
            | Self::TrialCancelled(p) => Some(p),
            Self::Cancellation(d) => Some(&d.purchase),
            Self::SubscriptionPaused(d) => Some(&d.purchase),
            Self::Expiration(d) => Some(&d.purchase),
            Self::ProductChange(d) => Some(&d.purchase),
            Self::BillingIssue(d) => Some(&d.purchase),
            Self::Refund(d) => Some(&d.purchase),
            Self::SubscriptionExtended(d) => Some(&d.purchase),
            Self::Transfer(_)
            | Self::InvoiceIssuance(_)
            | Self::TemporaryEntitlementGrant
            | Self::VirtualCurrencyTransaction(_) => None,
        }
    }
}

/// A single RevenueCat webhook event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub base: EventBase,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Discriminant of this event
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// Unique event identifier
    pub fn id(&self) -> &str {
        &self.base.id
    }

    /// Check whether this event has the given type
    pub fn is(&self, event_type: EventType) -> bool {
        self.event_type() == event_type
    }

    /// Check if this is an `INITIAL_PURCHASE` event
    pub fn is_initial_purchase(&self) -> bool {
        matches!(self.kind, EventKind::InitialPurchase(_))
    }

    /// Check if this is a `RENEWAL` event
    pub fn is_renewal(&self) -> bool {
        matches!(self.kind, EventKind::Renewal(_))
    }

    /// Purchase fields of an `INITIAL_PURCHASE` event
    pub fn as_initial_purchase(&self) -> Option<&PurchaseFields> {
        match &self.kind {
            EventKind::InitialPurchase(p) => Some(p),
            _ => None,
        }
    }

    /// Purchase fields of a `RENEWAL` event
    pub fn as_renewal(&self) -> Option<&PurchaseFields> {
        match &self.kind {
            EventKind::Renewal(p) => Some(p),
            _ => None,
        }
    }

    /// Purchase block, for the variants that carry one
    pub fn purchase(&self) -> Option<&PurchaseFields> {
        self.kind.purchase()
    }

    /// Product identifier, for the variants that carry one
    pub fn product_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::InvoiceIssuance(d) => Some(&d.product_id),
            EventKind::VirtualCurrencyTransaction(d) => Some(&d.product_id),
            kind => kind.purchase().map(|p| p.product_id.as_str()),
        }
    }

    /// Purchase environment, for the variants that carry one
    pub fn environment(&self) -> Option<Environment> {
        match &self.kind {
            EventKind::InvoiceIssuance(d) => Some(d.environment),
            EventKind::VirtualCurrencyTransaction(d) => Some(d.purchase_environment),
            kind => kind.purchase().map(|p| p.environment),
        }
    }

    /// Event time as UTC, `None` if the millisecond value is out of range
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.base.event_timestamp_ms)
    }
}

/// Webhook request body: the event plus the API version that rendered it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub event: Event,
    pub api_version: String,
}

impl WebhookPayload {
    /// Parse from raw JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SchemaError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| SchemaError::InvalidPayload(e.to_string()))?;
        Self::from_value(value)
    }

    /// Parse from an already decoded JSON value
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        // Report an unrecognised tag as such rather than as a shape mismatch.
        if let Some(tag) = value
            .get("event")
            .and_then(|e| e.get("type"))
            .and_then(Value::as_str)
        {
            EventType::from_str(tag)?;
        }

        serde_json::from_value(value).map_err(|e| SchemaError::InvalidPayload(e.to_string()))
    }
}

impl FromStr for WebhookPayload {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}
