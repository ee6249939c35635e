use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use storefront_common::AppError;
use crate::models::CheckoutSessionRecord;

/// Persistence for checkout session records.
///
/// `upsert` creates the record or replaces the existing one with the same id.
#[async_trait]
pub trait CheckoutSessionStore: Send + Sync {
    async fn upsert(&self, record: &CheckoutSessionRecord) -> Result<(), AppError>;

    async fn get(&self, id: &str) -> Result<Option<CheckoutSessionRecord>, AppError>;
}

#[derive(Clone)]
pub struct PgCheckoutSessionStore {
    pool: PgPool,
}

impl PgCheckoutSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckoutSessionStore for PgCheckoutSessionStore {
    async fn upsert(&self, record: &CheckoutSessionRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO checkout_sessions (id, amount_total, currency, customer, payment_status, created, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (id) DO UPDATE SET
                amount_total = EXCLUDED.amount_total,
                currency = EXCLUDED.currency,
                customer = EXCLUDED.customer,
                payment_status = EXCLUDED.payment_status,
                created = EXCLUDED.created,
                updated_at = NOW()
            "#,
        )
        .bind(&record.id)
        .bind(record.amount_total)
        .bind(&record.currency)
        .bind(&record.customer)
        .bind(&record.payment_status)
        .bind(record.created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<CheckoutSessionRecord>, AppError> {
        let record = sqlx::query_as::<_, CheckoutSessionRecord>(
            r#"
            SELECT id, amount_total, currency, customer, payment_status, created
            FROM checkout_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

/// Process-local store for development and tests.
#[derive(Default)]
pub struct InMemoryCheckoutSessionStore {
    records: RwLock<HashMap<String, CheckoutSessionRecord>>,
}

impl InMemoryCheckoutSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CheckoutSessionStore for InMemoryCheckoutSessionStore {
    async fn upsert(&self, record: &CheckoutSessionRecord) -> Result<(), AppError> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<CheckoutSessionRecord>, AppError> {
        Ok(self.records.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, payment_status: &str) -> CheckoutSessionRecord {
        CheckoutSessionRecord {
            id: id.to_string(),
            amount_total: Some(500),
            currency: "usd".to_string(),
            customer: Some("a@b.com".to_string()),
            payment_status: payment_status.to_string(),
            created: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_in_memory_upsert_replaces() {
        let store = InMemoryCheckoutSessionStore::new();
        assert!(store.is_empty().await);

        store.upsert(&record("cs_1", "unpaid")).await.unwrap();
        store.upsert(&record("cs_1", "paid")).await.unwrap();

        assert_eq!(store.len().await, 1);
        let stored = store.get("cs_1").await.unwrap().unwrap();
        assert_eq!(stored.payment_status, "paid");
    }

    #[tokio::test]
    async fn test_in_memory_get_missing() {
        let store = InMemoryCheckoutSessionStore::new();
        store.upsert(&record("cs_1", "paid")).await.unwrap();

        assert!(store.get("cs_2").await.unwrap().is_none());
    }
}
