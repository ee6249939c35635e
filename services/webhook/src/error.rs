use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use storefront_common::{ApiResponse, AppError, SignatureError};

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("{0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("{0}")]
    InvalidPayload(String),

    #[error("Failed to store checkout session {session_id}: {source}")]
    Persistence {
        session_id: String,
        #[source]
        source: AppError,
    },
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature(_) | WebhookError::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            WebhookError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            WebhookError::InvalidSignature(_) | WebhookError::InvalidPayload(_) => {
                (status, format!("Webhook Error: {}", self)).into_response()
            }
            WebhookError::Persistence { .. } => {
                (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
            }
        }
    }
}
