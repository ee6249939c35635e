use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use storefront_common::AppError;
use storefront_database::CheckoutSessionRecord;

pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const PAYMENT_METHOD_ATTACHED: &str = "payment_method.attached";
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Envelope of a provider event after signature verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub livemode: bool,
    /// Absent `data` decodes to a null object; only checkout sessions need one.
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventData {
    pub object: Value,
}

/// Event types this service recognises. Anything else is `Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    PaymentIntentSucceeded(Value),
    PaymentMethodAttached(Value),
    CheckoutSessionCompleted(Value),
    Unknown(String),
}

impl From<WebhookEvent> for EventKind {
    fn from(event: WebhookEvent) -> Self {
        let object = event.data.object;
        match event.event_type.as_str() {
            PAYMENT_INTENT_SUCCEEDED => EventKind::PaymentIntentSucceeded(object),
            PAYMENT_METHOD_ATTACHED => EventKind::PaymentMethodAttached(object),
            CHECKOUT_SESSION_COMPLETED => EventKind::CheckoutSessionCompleted(object),
            _ => EventKind::Unknown(event.event_type),
        }
    }
}

/// The fields of a checkout session object that get persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub amount_total: Option<i64>,
    pub currency: String,
    pub customer_details: CustomerDetails,
    pub payment_status: String,
    /// Unix seconds.
    pub created: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

impl CheckoutSession {
    pub fn from_object(object: &Value) -> Result<Self, AppError> {
        Ok(serde_json::from_value(object.clone())?)
    }

    pub fn into_record(self) -> Result<CheckoutSessionRecord, AppError> {
        let created = unix_seconds_to_datetime(self.created)?;

        Ok(CheckoutSessionRecord {
            id: self.id,
            amount_total: self.amount_total,
            currency: self.currency,
            customer: self.customer_details.email,
            payment_status: self.payment_status,
            created,
        })
    }
}

pub fn unix_seconds_to_datetime(seconds: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AppError::Validation(format!("created timestamp {} is out of range", seconds)))
}
