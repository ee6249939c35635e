use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

/// Name of the collection (table) holding checkout sessions.
pub const CHECKOUT_SESSIONS: &str = "checkout_sessions";

/// A completed checkout as persisted, keyed by the provider's session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CheckoutSessionRecord {
    pub id: String,
    /// Minor currency units; the provider sends null for some sessions.
    pub amount_total: Option<i64>,
    pub currency: String,
    /// Customer email; the provider may omit it.
    pub customer: Option<String>,
    pub payment_status: String,
    pub created: DateTime<Utc>,
}
