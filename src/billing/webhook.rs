//! Payment processor webhooks: signature check and event decoding.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use uuid::Uuid;

use super::BillingError;
use crate::domain::plan::{PlanTier, SubscriptionStatus};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verify a `t=<unix>,v1=<hex>` signature header over `"{t}.{payload}"`.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), BillingError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(BillingError::InvalidSignature)?;
    let issued: i64 = timestamp.parse().map_err(|_| BillingError::InvalidSignature)?;
    if signatures.is_empty() || (now - issued).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(BillingError::InvalidSignature);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| BillingError::InvalidSignature)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if matched {
        Ok(())
    } else {
        Err(BillingError::InvalidSignature)
    }
}

/// Build a signature header the same way the processor does.
pub fn signature_header(
    payload: &[u8],
    secret: &str,
    timestamp: i64,
) -> Result<String, BillingError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| BillingError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    CheckoutCompleted(CheckoutCompleted),
    SubscriptionChanged(SubscriptionSnapshot),
    SubscriptionDeleted(SubscriptionSnapshot),
    Ignored(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutCompleted {
    pub profile_id: Uuid,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
    pub plan: Option<PlanTier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionSnapshot {
    pub subscription_id: String,
    pub customer_id: Option<String>,
    pub profile_id: Option<Uuid>,
    pub status: SubscriptionStatus,
    pub price_id: Option<String>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: Value,
}

#[derive(Deserialize)]
struct CheckoutSessionObject {
    client_reference_id: Option<String>,
    customer: Option<String>,
    subscription: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Deserialize)]
struct SubscriptionObject {
    id: String,
    customer: Option<String>,
    status: String,
    #[serde(default)]
    cancel_at_period_end: bool,
    current_period_start: Option<i64>,
    current_period_end: Option<i64>,
    items: Option<ItemList>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Deserialize)]
struct ItemList {
    #[serde(default)]
    data: Vec<SubscriptionItem>,
}

#[derive(Deserialize)]
struct SubscriptionItem {
    price: Option<PriceRef>,
    current_period_start: Option<i64>,
    current_period_end: Option<i64>,
}

#[derive(Deserialize)]
struct PriceRef {
    id: String,
}

pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, BillingError> {
    let event: RawEvent = serde_json::from_slice(payload)
        .map_err(|err| BillingError::MalformedEvent(err.to_string()))?;

    match event.kind.as_str() {
        "checkout.session.completed" => {
            let session: CheckoutSessionObject = decode_object(event.data.object)?;
            let profile_id = session
                .client_reference_id
                .as_deref()
                .or_else(|| session.metadata.get("profile_id").map(String::as_str))
                .and_then(|id| Uuid::parse_str(id).ok())
                .ok_or_else(|| {
                    BillingError::MalformedEvent("checkout session has no profile reference".into())
                })?;
            Ok(WebhookEvent::CheckoutCompleted(CheckoutCompleted {
                profile_id,
                customer_id: session.customer,
                subscription_id: session.subscription,
                plan: session.metadata.get("plan").and_then(|p| p.parse().ok()),
            }))
        }
        "customer.subscription.created" | "customer.subscription.updated" => Ok(
            WebhookEvent::SubscriptionChanged(snapshot(decode_object(event.data.object)?)),
        ),
        "customer.subscription.deleted" => Ok(WebhookEvent::SubscriptionDeleted(snapshot(
            decode_object(event.data.object)?,
        ))),
        other => Ok(WebhookEvent::Ignored(other.to_string())),
    }
}

fn decode_object<T: serde::de::DeserializeOwned>(object: Value) -> Result<T, BillingError> {
    serde_json::from_value(object).map_err(|err| BillingError::MalformedEvent(err.to_string()))
}

fn snapshot(sub: SubscriptionObject) -> SubscriptionSnapshot {
    let first_item = sub.items.and_then(|items| items.data.into_iter().next());
    let (item_start, item_end, price_id) = match first_item {
        Some(item) => (
            item.current_period_start,
            item.current_period_end,
            item.price.map(|p| p.id),
        ),
        None => (None, None, None),
    };

    SubscriptionSnapshot {
        subscription_id: sub.id,
        customer_id: sub.customer,
        profile_id: sub
            .metadata
            .get("profile_id")
            .and_then(|id| Uuid::parse_str(id).ok()),
        status: SubscriptionStatus::from_processor(&sub.status),
        price_id,
        current_period_start: sub
            .current_period_start
            .or(item_start)
            .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        current_period_end: sub
            .current_period_end
            .or(item_end)
            .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        cancel_at_period_end: sub.cancel_at_period_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";

    #[test]
    fn accepts_a_fresh_valid_signature() {
        let payload = br#"{"type":"ping"}"#;
        let header = signature_header(payload, SECRET, 1_700_000_000).unwrap();
        assert!(verify_signature(payload, &header, SECRET, 1_700_000_100).is_ok());
    }

    #[test]
    fn rejects_tampered_stale_or_malformed_signatures() {
        let payload = br#"{"type":"ping"}"#;
        let header = signature_header(payload, SECRET, 1_700_000_000).unwrap();

        assert!(verify_signature(br#"{"type":"pong"}"#, &header, SECRET, 1_700_000_000).is_err());
        assert!(verify_signature(payload, &header, "other", 1_700_000_000).is_err());
        assert!(
            verify_signature(payload, &header, SECRET, 1_700_000_000 + SIGNATURE_TOLERANCE_SECS + 1)
                .is_err()
        );
        assert!(verify_signature(payload, "v1=deadbeef", SECRET, 1_700_000_000).is_err());
        assert!(verify_signature(payload, "t=1700000000", SECRET, 1_700_000_000).is_err());
    }

    #[test]
    fn parses_checkout_completion() {
        let profile_id = Uuid::new_v4();
        let payload = json!({
            "type": "checkout.session.completed",
            "data": { "object": {
                "client_reference_id": profile_id.to_string(),
                "customer": "cus_123",
                "subscription": "sub_123",
                "metadata": { "plan": "yearly" }
            }}
        });
        let event = parse_event(payload.to_string().as_bytes()).unwrap();
        assert_eq!(
            event,
            WebhookEvent::CheckoutCompleted(CheckoutCompleted {
                profile_id,
                customer_id: Some("cus_123".into()),
                subscription_id: Some("sub_123".into()),
                plan: Some(PlanTier::Yearly),
            })
        );
    }

    #[test]
    fn parses_subscription_update_with_item_periods() {
        let payload = json!({
            "type": "customer.subscription.updated",
            "data": { "object": {
                "id": "sub_9",
                "customer": "cus_9",
                "status": "past_due",
                "cancel_at_period_end": true,
                "items": { "data": [{
                    "price": { "id": "price_monthly" },
                    "current_period_start": 1_700_000_000,
                    "current_period_end": 1_702_592_000
                }]}
            }}
        });
        match parse_event(payload.to_string().as_bytes()).unwrap() {
            WebhookEvent::SubscriptionChanged(snap) => {
                assert_eq!(snap.subscription_id, "sub_9");
                assert_eq!(snap.status, SubscriptionStatus::PastDue);
                assert_eq!(snap.price_id.as_deref(), Some("price_monthly"));
                assert!(snap.cancel_at_period_end);
                assert_eq!(
                    snap.current_period_start.map(|d| d.timestamp()),
                    Some(1_700_000_000)
                );
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn unknown_events_are_ignored_and_garbage_is_rejected() {
        let payload = json!({ "type": "invoice.paid", "data": { "object": {} } });
        assert_eq!(
            parse_event(payload.to_string().as_bytes()).unwrap(),
            WebhookEvent::Ignored("invoice.paid".into())
        );
        assert!(matches!(
            parse_event(b"not json"),
            Err(BillingError::MalformedEvent(_))
        ));
    }
}
