//! Receives signed payment-provider webhooks and records completed checkout
//! sessions.
//!
//! Requests flow through a fixed pipeline: the raw body is checked against the
//! `stripe-signature` header ([`verifier`]), the decoded event is matched on
//! its type ([`webhooks`]), and `checkout.session.completed` sessions are
//! upserted into the configured [`CheckoutSessionStore`].

pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod routes;
pub mod verifier;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use storefront_database::CheckoutSessionStore;

use crate::config::{PersistenceFailurePolicy, WebhookSettings};
use crate::verifier::SignatureVerifier;
use crate::webhooks::WebhookProcessor;

#[derive(Clone)]
pub struct AppState {
    pub verifier: SignatureVerifier,
    pub processor: WebhookProcessor,
    pub persistence_failure_policy: PersistenceFailurePolicy,
}

impl AppState {
    pub fn new(settings: &WebhookSettings, store: Arc<dyn CheckoutSessionStore>) -> Self {
        Self {
            verifier: SignatureVerifier::new(settings.secret.clone(), settings.tolerance_seconds),
            processor: WebhookProcessor::new(store),
            persistence_failure_policy: settings.persistence_failure_policy,
        }
    }
}

/// Builds the application router with tracing and the 404 fallback.
pub fn build_app(state: AppState) -> Router {
    routes::create_routes()
        .fallback(handlers::handler_404)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
