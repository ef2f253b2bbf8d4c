//! Stripe webhook verification and event mapping.
//!
//! Stripe signs each delivery with a `Stripe-Signature` header of the form
//! `t=<unix seconds>,v1=<hex hmac>[,v1=...]`. The signed payload is
//! `"{t}.{raw body}"` and the key is the endpoint's signing secret.

use covergen_core::plans::PlanType;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use crate::config::BillingConfig;
use crate::BillingError;

type HmacSha256 = Hmac<Sha256>;

/// Check the `Stripe-Signature` header against `payload`.
///
/// Succeeds if any `v1` signature matches and the timestamp is within
/// `tolerance_secs` of `now` (unix seconds). Comparison is constant-time.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: u64,
) -> Result<(), BillingError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();
    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                if let Some(sig) = decode_hex(value) {
                    signatures.push(sig);
                }
            }
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| BillingError::InvalidSignature("missing timestamp".into()))?;
    if signatures.is_empty() {
        return Err(BillingError::InvalidSignature("no v1 signature".into()));
    }
    if now.abs_diff(timestamp) > tolerance_secs {
        return Err(BillingError::InvalidSignature(
            "timestamp outside the tolerance window".into(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| BillingError::InvalidSignature("unusable signing secret".into()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures
        .iter()
        .any(|sig| mac.clone().verify_slice(sig).is_ok());
    if matched {
        Ok(())
    } else {
        Err(BillingError::InvalidSignature("signature mismatch".into()))
    }
}

/// Compute the `v1` signature Stripe would send for `payload` at `timestamp`.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// The parts of a Stripe event this service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

pub fn parse_event(payload: &[u8]) -> Result<StripeEvent, BillingError> {
    serde_json::from_slice(payload).map_err(|e| BillingError::InvalidPayload(e.to_string()))
}

/// What a webhook event means for our subscriptions table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingAction {
    /// A checkout finished; link the customer and start the subscription.
    CheckoutCompleted {
        user_id: Option<i64>,
        customer_id: Option<String>,
        subscription_id: Option<String>,
        plan: Option<PlanType>,
    },
    /// Subscription created or updated (plan change, renewal, status).
    SubscriptionChanged {
        subscription_id: String,
        customer_id: Option<String>,
        status: String,
        plan: Option<PlanType>,
        current_period_end: Option<i64>,
    },
    SubscriptionCanceled {
        subscription_id: String,
        customer_id: Option<String>,
    },
    PaymentFailed {
        customer_id: Option<String>,
        subscription_id: Option<String>,
    },
    /// Event types we do not act on.
    Ignored { event_type: String },
}

impl BillingAction {
    pub fn from_event(event: &StripeEvent, config: &BillingConfig) -> Self {
        let object = &event.data.object;
        let text = |v: &Value| v.as_str().map(str::to_string);

        match event.event_type.as_str() {
            "checkout.session.completed" => Self::CheckoutCompleted {
                user_id: object["client_reference_id"]
                    .as_str()
                    .and_then(|id| id.parse().ok()),
                customer_id: text(&object["customer"]),
                subscription_id: text(&object["subscription"]),
                plan: object["metadata"]["plan"]
                    .as_str()
                    .and_then(|p| PlanType::from_name(p).ok()),
            },
            "customer.subscription.created" | "customer.subscription.updated" => {
                let Some(subscription_id) = text(&object["id"]) else {
                    return Self::Ignored {
                        event_type: event.event_type.clone(),
                    };
                };
                let plan = object["items"]["data"][0]["price"]["id"]
                    .as_str()
                    .and_then(|price| config.plan_for_price(price))
                    .or_else(|| {
                        object["metadata"]["plan"]
                            .as_str()
                            .and_then(|p| PlanType::from_name(p).ok())
                    });
                // Newer API versions report the period per subscription item.
                let current_period_end = object["current_period_end"]
                    .as_i64()
                    .or_else(|| object["items"]["data"][0]["current_period_end"].as_i64());
                Self::SubscriptionChanged {
                    subscription_id,
                    customer_id: text(&object["customer"]),
                    status: normalize_status(object["status"].as_str().unwrap_or("incomplete"))
                        .to_string(),
                    plan,
                    current_period_end,
                }
            }
            "customer.subscription.deleted" => match text(&object["id"]) {
                Some(subscription_id) => Self::SubscriptionCanceled {
                    subscription_id,
                    customer_id: text(&object["customer"]),
                },
                None => Self::Ignored {
                    event_type: event.event_type.clone(),
                },
            },
            "invoice.payment_failed" => Self::PaymentFailed {
                customer_id: text(&object["customer"]),
                subscription_id: text(&object["subscription"]),
            },
            other => Self::Ignored {
                event_type: other.to_string(),
            },
        }
    }
}

/// Map Stripe's subscription statuses onto the five we store.
pub fn normalize_status(status: &str) -> &'static str {
    match status {
        "active" => "active",
        "trialing" => "trialing",
        "past_due" | "unpaid" => "past_due",
        "canceled" | "incomplete_expired" => "canceled",
        _ => "incomplete",
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_760_000_000;

    fn header(payload: &[u8], secret: &str, t: i64) -> String {
        format!("t={t},v1={}", sign_payload(payload, secret, t))
    }

    #[test]
    fn valid_signature_is_accepted() {
        let body = br#"{"id":"evt_1"}"#;
        let h = header(body, SECRET, NOW);
        assert!(verify_signature(body, &h, SECRET, NOW + 10, 300).is_ok());
    }

    #[test]
    fn any_matching_v1_is_enough() {
        let body = br#"{"id":"evt_1"}"#;
        let h = format!(
            "t={NOW},v1={},v1={}",
            "00".repeat(32),
            sign_payload(body, SECRET, NOW)
        );
        assert!(verify_signature(body, &h, SECRET, NOW, 300).is_ok());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let h = header(br#"{"amount":1}"#, SECRET, NOW);
        assert_matches!(
            verify_signature(br#"{"amount":9}"#, &h, SECRET, NOW, 300),
            Err(BillingError::InvalidSignature(msg)) if msg.contains("mismatch")
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let body = b"{}";
        let h = header(body, "whsec_other", NOW);
        assert!(verify_signature(body, &h, SECRET, NOW, 300).is_err());
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let body = b"{}";
        let h = header(body, SECRET, NOW - 301);
        assert_matches!(
            verify_signature(body, &h, SECRET, NOW, 300),
            Err(BillingError::InvalidSignature(msg)) if msg.contains("tolerance")
        );
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(verify_signature(b"{}", "", SECRET, NOW, 300).is_err());
        assert!(verify_signature(b"{}", "v1=abcd", SECRET, NOW, 300).is_err());
        assert!(verify_signature(b"{}", &format!("t={NOW},v1=zz"), SECRET, NOW, 300).is_err());
    }

    fn config() -> BillingConfig {
        let mut config = BillingConfig::disabled();
        config.price_pro = Some("price_pro".into());
        config.price_business = Some("price_biz".into());
        config
    }

    fn event(event_type: &str, object: Value) -> StripeEvent {
        parse_event(
            json!({ "id": "evt_1", "type": event_type, "data": { "object": object } })
                .to_string()
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn checkout_completed_maps_reference_and_plan() {
        let e = event(
            "checkout.session.completed",
            json!({
                "client_reference_id": "42",
                "customer": "cus_1",
                "subscription": "sub_1",
                "metadata": { "plan": "pro" }
            }),
        );
        assert_eq!(
            BillingAction::from_event(&e, &config()),
            BillingAction::CheckoutCompleted {
                user_id: Some(42),
                customer_id: Some("cus_1".into()),
                subscription_id: Some("sub_1".into()),
                plan: Some(PlanType::Pro),
            }
        );
    }

    #[test]
    fn subscription_update_resolves_plan_from_price() {
        let e = event(
            "customer.subscription.updated",
            json!({
                "id": "sub_1",
                "customer": "cus_1",
                "status": "unpaid",
                "items": { "data": [ { "price": { "id": "price_biz" }, "current_period_end": 1770000000 } ] }
            }),
        );
        assert_eq!(
            BillingAction::from_event(&e, &config()),
            BillingAction::SubscriptionChanged {
                subscription_id: "sub_1".into(),
                customer_id: Some("cus_1".into()),
                status: "past_due".into(),
                plan: Some(PlanType::Business),
                current_period_end: Some(1_770_000_000),
            }
        );
    }

    #[test]
    fn deletion_and_payment_failure() {
        let e = event("customer.subscription.deleted", json!({ "id": "sub_1", "customer": "cus_1" }));
        assert_matches!(
            BillingAction::from_event(&e, &config()),
            BillingAction::SubscriptionCanceled { subscription_id, .. } if subscription_id == "sub_1"
        );

        let e = event("invoice.payment_failed", json!({ "customer": "cus_1", "subscription": "sub_1" }));
        assert_matches!(
            BillingAction::from_event(&e, &config()),
            BillingAction::PaymentFailed { customer_id: Some(c), .. } if c == "cus_1"
        );
    }

    #[test]
    fn unknown_events_are_ignored() {
        let e = event("charge.refunded", json!({}));
        assert_eq!(
            BillingAction::from_event(&e, &config()),
            BillingAction::Ignored {
                event_type: "charge.refunded".into()
            }
        );
    }

    #[test]
    fn garbage_payload_is_invalid() {
        assert_matches!(parse_event(b"not json"), Err(BillingError::InvalidPayload(_)));
    }
}
