//! Shared webhook fixtures for integration tests.

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use vemix_web::EventType;

/// Fields every event carries
fn base(event_type: EventType) -> Map<String, Value> {
    let value = json!({
        "type": event_type.as_str(),
        "id": format!("evt_{}", event_type.as_str().to_lowercase()),
        "app_id": "appecb325e35e",
        "app_user_id": "C4FD158C-48A9-4BEC-9E00-3364D7E7DDFF",
        "original_app_user_id": "C4FD158C-48A9-4BEC-9E00-3364D7E7DDFF",
        "aliases": ["C4FD158C-48A9-4BEC-9E00-3364D7E7DDFF"],
        "event_timestamp_ms": 1754692278482_i64,
        "store": "APP_STORE",
        "subscriber_attributes": {
            "$attConsentStatus": {
                "updated_at_ms": 1754082681428_i64,
                "value": "notDetermined"
            }
        }
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Fields shared by subscription purchase events
fn purchase(product_id: &str) -> Value {
    json!({
        "product_id": product_id,
        "period_type": "NORMAL",
        "purchased_at_ms": 1754687476000_i64,
        "expiration_at_ms": 1755292276000_i64,
        "environment": "PRODUCTION",
        "entitlement_id": null,
        "entitlement_ids": ["Pro"],
        "presented_offering_id": "bentelte",
        "transaction_id": "480002610028645",
        "original_transaction_id": "480002600407555",
        "is_family_share": false,
        "is_trial_conversion": false,
        "country_code": "US",
        "currency": "USD",
        "price": 9.99,
        "price_in_purchased_currency": 9.99,
        "takehome_percentage": 0.7,
        "offer_code": null,
        "tax_percentage": 0,
        "commission_percentage": 0.3,
        "renewal_number": 2,
        "metadata": null
    })
}

fn invoice(product_id: &str) -> Value {
    json!({
        "product_id": product_id,
        "period_type": null,
        "purchased_at_ms": 1754687476000_i64,
        "expiration_at_ms": null,
        "environment": "SANDBOX",
        "entitlement_id": null,
        "entitlement_ids": null,
        "presented_offering_id": null,
        "transaction_id": null,
        "original_transaction_id": null,
        "is_family_share": false,
        "country_code": "DE",
        "currency": "EUR",
        "price_in_purchased_currency": 49.0,
        "takehome_percentage": null,
        "offer_code": null,
        "tax_percentage": null,
        "commission_percentage": null,
        "metadata": null,
        "renewal_number": null
    })
}

fn virtual_currency(product_id: &str) -> Value {
    json!({
        "adjustments": [
            {
                "amount": 100,
                "currency": { "code": "GEMS", "name": "Gems", "description": "Premium gems" }
            },
            {
                "amount": -5,
                "currency": { "code": "COINS", "name": "Coins", "description": "Soft currency" }
            }
        ],
        "product_display_name": "Gem Pack",
        "product_id": product_id,
        "purchase_environment": "PRODUCTION",
        "source": "in_app_purchase",
        "transaction_id": "480002610028999",
        "virtual_currency_transaction_id": "vct_123"
    })
}

fn extend(map: &mut Map<String, Value>, extra: Value) {
    if let Value::Object(extra) = extra {
        map.extend(extra);
    }
}

/// A complete, valid event of the given type
pub fn event(event_type: EventType, product_id: &str) -> Value {
    let mut map = base(event_type);

    match event_type {
        EventType::InitialPurchase
        | EventType::Renewal
        | EventType::Uncancellation
        | EventType::NonRenewingPurchase
        | EventType::RefundReversed
        | EventType::TrialStarted
        | EventType::TrialCancelled => extend(&mut map, purchase(product_id)),
        EventType::Cancellation => {
            extend(&mut map, purchase(product_id));
            extend(&mut map, json!({ "cancel_reason": "UNSUBSCRIBE" }));
        }
        EventType::SubscriptionPaused => {
            extend(&mut map, purchase(product_id));
            extend(&mut map, json!({ "auto_resume_at_ms": 1756000000000_i64 }));
        }
        EventType::Expiration => {
            extend(&mut map, purchase(product_id));
            extend(&mut map, json!({ "expiration_reason": "BILLING_ERROR" }));
        }
        EventType::ProductChange => {
            extend(&mut map, purchase(product_id));
            extend(&mut map, json!({ "old_product_id": "com.vemix.weekly" }));
        }
        EventType::BillingIssue => {
            extend(&mut map, purchase(product_id));
            extend(
                &mut map,
                json!({ "grace_period_expiration_at_ms": 1755900000000_i64 }),
            );
        }
        EventType::Refund => {
            extend(&mut map, purchase(product_id));
            extend(&mut map, json!({ "refund_reason": "CUSTOMER_REQUEST" }));
        }
        EventType::SubscriptionExtended => {
            extend(&mut map, purchase(product_id));
            extend(
                &mut map,
                json!({ "new_expiration_at_ms": 1755900000000_i64 }),
            );
        }
        EventType::Transfer => extend(
            &mut map,
            json!({
                "transferred_from": ["$RCAnonymousID:old"],
                "transferred_to": ["C4FD158C-48A9-4BEC-9E00-3364D7E7DDFF"]
            }),
        ),
        EventType::InvoiceIssuance => extend(&mut map, invoice(product_id)),
        EventType::TemporaryEntitlementGrant => {}
        EventType::VirtualCurrencyTransaction => extend(&mut map, virtual_currency(product_id)),
    }

    Value::Object(map)
}

/// A delivery wrapping one event
pub fn payload(event_type: EventType, product_id: &str) -> Value {
    json!({
        "api_version": "1.0",
        "event": event(event_type, product_id),
    })
}
