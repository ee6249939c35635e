use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Provider webhook, authenticated by signature rather than by session
        .route("/webhook", post(handlers::handle_webhook))
}
