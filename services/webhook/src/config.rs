use std::str::FromStr;

use serde::{Deserialize, Serialize};
use storefront_common::{signature::DEFAULT_TOLERANCE_SECS, AppError, DatabaseConfig, ServerConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub webhook: WebhookSettings,
    pub store_backend: StoreBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSettings {
    #[serde(skip_serializing)]
    pub secret: String,
    /// Maximum age of a signed timestamp, in seconds. Zero disables the check.
    pub tolerance_seconds: i64,
    pub persistence_failure_policy: PersistenceFailurePolicy,
}

/// What the endpoint answers when a checkout session could not be stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceFailurePolicy {
    /// Log the failure and still return 200, so the provider does not retry.
    #[default]
    Acknowledge,
    /// Return 500 and let the provider's retry schedule redeliver the event.
    Surface,
}

impl FromStr for PersistenceFailurePolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "acknowledge" => Ok(Self::Acknowledge),
            "surface" => Ok(Self::Surface),
            other => Err(AppError::Configuration(format!(
                "unknown persistence failure policy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Configuration(format!("unknown store backend '{}'", other))),
        }
    }
}

impl WebhookConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Configuration("STRIPE_WEBHOOK_SECRET must be set".to_string()))?;

        Ok(Self {
            server: ServerConfig {
                host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            database: DatabaseConfig::from_env(),
            webhook: WebhookSettings {
                secret,
                tolerance_seconds: std::env::var("WEBHOOK_TOLERANCE_SECONDS")
                    .unwrap_or_else(|_| DEFAULT_TOLERANCE_SECS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_TOLERANCE_SECS),
                persistence_failure_policy: match std::env::var("PERSISTENCE_FAILURE_POLICY") {
                    Ok(value) => value.parse()?,
                    Err(_) => PersistenceFailurePolicy::default(),
                },
            },
            store_backend: match std::env::var("STORE_BACKEND") {
                Ok(value) => value.parse()?,
                Err(_) => StoreBackend::default(),
            },
        })
    }
}

impl WebhookSettings {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_seconds: DEFAULT_TOLERANCE_SECS,
            persistence_failure_policy: PersistenceFailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PersistenceFailurePolicy) -> Self {
        self.persistence_failure_policy = policy;
        self
    }
}
