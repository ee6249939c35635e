use storefront_common::signature::{verify_signature, SignatureError};

use crate::error::WebhookError;
use crate::events::WebhookEvent;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Verifies provider signatures and decodes the event envelope.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    tolerance_seconds: i64,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>, tolerance_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_seconds,
        }
    }

    pub fn construct_event(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookEvent, WebhookError> {
        self.construct_event_at(payload, signature, chrono::Utc::now().timestamp())
    }

    /// Same as [`construct_event`](Self::construct_event) with an explicit clock.
    pub fn construct_event_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<WebhookEvent, WebhookError> {
        let signature = signature.ok_or(SignatureError::MissingHeader)?;
        verify_signature(payload, signature, &self.secret, self.tolerance_seconds, now)?;

        serde_json::from_slice(payload).map_err(|e| {
            WebhookError::InvalidPayload(format!("Invalid event payload: {}", e))
        })
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"[redacted]")
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish()
    }
}
