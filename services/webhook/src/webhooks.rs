use std::sync::Arc;

use serde_json::Value;
use storefront_database::{CheckoutSessionStore, CHECKOUT_SESSIONS};

use crate::error::WebhookError;
use crate::events::{CheckoutSession, EventKind, WebhookEvent};

/// Which branch handled an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    PaymentIntentSucceeded,
    PaymentMethodAttached,
    CheckoutSessionStored { session_id: String },
    Unhandled { event_type: String },
}

/// Dispatches verified events and writes completed checkout sessions.
#[derive(Clone)]
pub struct WebhookProcessor {
    store: Arc<dyn CheckoutSessionStore>,
}

impl WebhookProcessor {
    pub fn new(store: Arc<dyn CheckoutSessionStore>) -> Self {
        Self { store }
    }

    pub async fn process(&self, event: WebhookEvent) -> Result<WebhookOutcome, WebhookError> {
        tracing::debug!(event_id = ?event.id, event_type = %event.event_type, "Processing webhook event");

        match EventKind::from(event) {
            EventKind::PaymentIntentSucceeded(payment_intent) => {
                Ok(Self::handle_payment_intent_succeeded(&payment_intent))
            }
            EventKind::PaymentMethodAttached(_) => Ok(WebhookOutcome::PaymentMethodAttached),
            EventKind::CheckoutSessionCompleted(session) => {
                self.handle_checkout_session(&session).await
            }
            EventKind::Unknown(event_type) => {
                tracing::info!("Unhandled event type {}", event_type);
                Ok(WebhookOutcome::Unhandled { event_type })
            }
        }
    }

    fn handle_payment_intent_succeeded(payment_intent: &Value) -> WebhookOutcome {
        tracing::info!(
            amount = ?payment_intent.get("amount"),
            "PaymentIntent was successful"
        );
        WebhookOutcome::PaymentIntentSucceeded
    }

    async fn handle_checkout_session(&self, object: &Value) -> Result<WebhookOutcome, WebhookError> {
        let session_id = object
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let record = CheckoutSession::from_object(object)
            .and_then(CheckoutSession::into_record)
            .map_err(|source| WebhookError::Persistence {
                session_id: session_id.clone(),
                source,
            })?;

        self.store
            .upsert(&record)
            .await
            .map_err(|source| WebhookError::Persistence {
                session_id: session_id.clone(),
                source,
            })?;

        tracing::info!(
            session_id = %record.id,
            collection = CHECKOUT_SESSIONS,
            "Checkout session stored"
        );
        Ok(WebhookOutcome::CheckoutSessionStored { session_id: record.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storefront_database::InMemoryCheckoutSessionStore;

    fn event(value: Value) -> WebhookEvent {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_checkout_session_is_stored() {
        let store = Arc::new(InMemoryCheckoutSessionStore::new());
        let processor = WebhookProcessor::new(store.clone());

        let outcome = processor
            .process(event(json!({
                "type": "checkout.session.completed",
                "data": { "object": {
                    "id": "cs_9",
                    "amount_total": 1299,
                    "currency": "gbp",
                    "customer_details": { "email": "c@d.com" },
                    "payment_status": "paid",
                    "created": 1700000000
                }}
            })))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::CheckoutSessionStored { session_id: "cs_9".to_string() }
        );
        let stored = store.get("cs_9").await.unwrap().unwrap();
        assert_eq!(stored.amount_total, Some(1299));
        assert_eq!(stored.customer.as_deref(), Some("c@d.com"));
    }

    #[tokio::test]
    async fn test_reserved_and_unknown_types_do_not_write() {
        let store = Arc::new(InMemoryCheckoutSessionStore::new());
        let processor = WebhookProcessor::new(store.clone());

        let outcome = processor
            .process(event(json!({
                "type": "payment_intent.succeeded",
                "data": { "object": { "id": "pi_1", "amount": 2000 } }
            })))
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::PaymentIntentSucceeded);

        let outcome = processor
            .process(event(json!({
                "type": "payment_method.attached",
                "data": { "object": { "id": "pm_1" } }
            })))
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::PaymentMethodAttached);

        let outcome = processor
            .process(event(json!({
                "type": "invoice.paid",
                "data": { "object": { "id": "in_1" } }
            })))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Unhandled { event_type: "invoice.paid".to_string() }
        );

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_malformed_session_is_a_persistence_error() {
        let store = Arc::new(InMemoryCheckoutSessionStore::new());
        let processor = WebhookProcessor::new(store.clone());

        let err = processor
            .process(event(json!({
                "type": "checkout.session.completed",
                "data": { "object": { "id": "cs_bad", "amount_total": 100 } }
            })))
            .await
            .unwrap_err();

        match err {
            WebhookError::Persistence { session_id, .. } => assert_eq!(session_id, "cs_bad"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.is_empty().await);
    }
}
