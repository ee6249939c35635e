use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_database::{
    create_pool, CheckoutSessionStore, InMemoryCheckoutSessionStore, MigrationRunner,
    PgCheckoutSessionStore,
};
use storefront_webhook::{
    build_app,
    config::{StoreBackend, WebhookConfig},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_webhook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = WebhookConfig::from_env()?;

    let store: Arc<dyn CheckoutSessionStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let db_pool = create_pool(&config.database).await?;
            MigrationRunner::new(db_pool.clone()).run_all_migrations().await?;
            Arc::new(PgCheckoutSessionStore::new(db_pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory checkout session store; records are lost on restart");
            Arc::new(InMemoryCheckoutSessionStore::new())
        }
    };

    let app = build_app(AppState::new(&config.webhook, store));

    // Start the server
    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;

    tracing::info!("Server running on port {}", config.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
