use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};

use storefront_common::ApiResponse;

use crate::{
    config::PersistenceFailurePolicy,
    error::WebhookError,
    verifier::SIGNATURE_HEADER,
    AppState,
};

// Webhook endpoint. The body must stay the exact bytes that were signed.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError> {
    // An empty header counts as missing; a non-ASCII one fails to parse
    let signature = headers
        .get(SIGNATURE_HEADER)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_str().unwrap_or_default());

    let event = state
        .verifier
        .construct_event(&body, signature)
        .map_err(|e| {
            tracing::warn!("Webhook signature verification failed. {}", e);
            e
        })?;

    match state.processor.process(event).await {
        Ok(outcome) => {
            tracing::debug!(?outcome, "Webhook handled");
            Ok(StatusCode::OK)
        }
        Err(e) => {
            tracing::error!("Error storing checkout session: {}", e);
            match state.persistence_failure_policy {
                PersistenceFailurePolicy::Acknowledge => Ok(StatusCode::OK),
                PersistenceFailurePolicy::Surface => Err(e),
            }
        }
    }
}

// Health check endpoint
pub async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::success("Webhook service is healthy".to_string()))
}

pub async fn handler_404() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Endpoint not found".to_string())),
    )
}
