//! Webhook wire payloads
//!
//! Deliveries arrive as `{id, type, data: {object: {...}}}` JSON. This
//! module decodes the types the reconciler consumes into an
//! [`EventEnvelope`]; unrecognized types decode to `None` and are
//! acknowledged without effect.

use serde::Deserialize;

use crate::types::{CardDetails, EventEnvelope, ProviderEvent, SyncError};

/// Top-level webhook delivery shape
#[derive(Debug, Deserialize)]
struct WebhookPayload {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    data: WebhookData,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct InstrumentObject {
    id: String,
    customer: Option<String>,
    card: CardObject,
}

#[derive(Debug, Deserialize)]
struct DetachedInstrumentObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CardObject {
    brand: String,
    last4: String,
    exp_month: u8,
    exp_year: u16,
}

#[derive(Debug, Deserialize)]
struct CustomerObject {
    id: String,
    default_payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IntentObject {
    id: String,
    customer: String,
    amount: i64,
    currency: String,
    description: Option<String>,
}

impl From<CardObject> for CardDetails {
    fn from(card: CardObject) -> Self {
        CardDetails {
            brand: card.brand,
            last4: card.last4,
            exp_month: card.exp_month,
            exp_year: card.exp_year,
        }
    }
}

/// Decode a raw delivery body
///
/// Returns `Ok(None)` for event types this service does not consume.
///
/// # Errors
///
/// Returns [`SyncError::MalformedEvent`] when the body is not valid JSON or
/// a recognized type is missing required fields.
pub fn parse_event(body: &[u8]) -> Result<Option<EventEnvelope>, SyncError> {
    let payload: WebhookPayload = serde_json::from_slice(body)?;
    let object = payload.data.object;

    let event = match payload.kind.as_str() {
        "payment_method.attached" => {
            let instrument: InstrumentObject = serde_json::from_value(object)?;
            let customer = instrument.customer.ok_or_else(|| {
                SyncError::malformed_event("payment_method.attached without customer")
            })?;
            ProviderEvent::InstrumentAttached {
                instrument: instrument.id,
                customer,
                card: instrument.card.into(),
            }
        }
        "payment_method.detached" => {
            let instrument: DetachedInstrumentObject = serde_json::from_value(object)?;
            ProviderEvent::InstrumentDetached {
                instrument: instrument.id,
            }
        }
        "payment_method.updated" => {
            let instrument: InstrumentObject = serde_json::from_value(object)?;
            ProviderEvent::InstrumentUpdated {
                instrument: instrument.id,
                card: instrument.card.into(),
            }
        }
        "customer.updated" => {
            let customer: CustomerObject = serde_json::from_value(object)?;
            ProviderEvent::CustomerUpdated {
                customer: customer.id,
                default_instrument: customer.default_payment_method,
            }
        }
        "payment_intent.succeeded" => intent_event(object, true)?,
        "payment_intent.payment_failed" => intent_event(object, false)?,
        _ => return Ok(None),
    };

    Ok(Some(EventEnvelope::new(payload.id, event)))
}

fn intent_event(object: serde_json::Value, succeeded: bool) -> Result<ProviderEvent, SyncError> {
    let intent: IntentObject = serde_json::from_value(object)?;
    let event = if succeeded {
        ProviderEvent::IntentSucceeded {
            intent: intent.id,
            customer: intent.customer,
            amount_minor: intent.amount,
            currency: intent.currency,
            description: intent.description,
        }
    } else {
        ProviderEvent::IntentFailed {
            intent: intent.id,
            customer: intent.customer,
            amount_minor: intent.amount,
            currency: intent.currency,
            description: intent.description,
        }
    };
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_attached() {
        let body = json!({
            "id": "evt_1",
            "type": "payment_method.attached",
            "data": { "object": {
                "id": "pm_1",
                "customer": "cus_1",
                "card": { "brand": "visa", "last4": "4242", "exp_month": 12, "exp_year": 2030 }
            }}
        });

        let envelope = parse_event(body.to_string().as_bytes()).unwrap().unwrap();
        assert_eq!(envelope.id, "evt_1");
        assert!(matches!(
            envelope.event,
            ProviderEvent::InstrumentAttached { ref instrument, ref customer, .. }
                if instrument == "pm_1" && customer == "cus_1"
        ));
    }

    #[test]
    fn test_parse_detached_tolerates_missing_customer() {
        let body = json!({
            "id": "evt_2",
            "type": "payment_method.detached",
            "data": { "object": { "id": "pm_1" } }
        });

        let envelope = parse_event(body.to_string().as_bytes()).unwrap().unwrap();
        assert!(matches!(
            envelope.event,
            ProviderEvent::InstrumentDetached { ref instrument } if instrument == "pm_1"
        ));
    }

    #[test]
    fn test_parse_customer_updated_with_null_default() {
        let body = json!({
            "id": "evt_3",
            "type": "customer.updated",
            "data": { "object": { "id": "cus_1", "default_payment_method": null } }
        });

        let envelope = parse_event(body.to_string().as_bytes()).unwrap().unwrap();
        assert!(matches!(
            envelope.event,
            ProviderEvent::CustomerUpdated { default_instrument: None, .. }
        ));
    }

    #[test]
    fn test_parse_intent_succeeded_preserves_amount() {
        let body = json!({
            "id": "evt_4",
            "type": "payment_intent.succeeded",
            "data": { "object": {
                "id": "pi_1",
                "customer": "cus_1",
                "amount": 4299,
                "currency": "usd",
                "description": "enamel pin"
            }}
        });

        let envelope = parse_event(body.to_string().as_bytes()).unwrap().unwrap();
        assert!(matches!(
            envelope.event,
            ProviderEvent::IntentSucceeded { amount_minor: 4299, ref currency, .. }
                if currency == "usd"
        ));
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        let body = json!({
            "id": "evt_5",
            "type": "invoice.finalized",
            "data": { "object": {} }
        });

        assert_eq!(parse_event(body.to_string().as_bytes()).unwrap(), None);
    }

    #[test]
    fn test_attached_without_customer_is_malformed() {
        let body = json!({
            "id": "evt_6",
            "type": "payment_method.attached",
            "data": { "object": {
                "id": "pm_1",
                "card": { "brand": "visa", "last4": "4242", "exp_month": 1, "exp_year": 2030 }
            }}
        });

        let result = parse_event(body.to_string().as_bytes());
        assert!(matches!(result, Err(SyncError::MalformedEvent { .. })));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let result = parse_event(b"{not json");
        assert!(matches!(result, Err(SyncError::MalformedEvent { .. })));
    }
}
