use sqlx::{postgres::PgPoolOptions, migrate::MigrateDatabase, Pool, Postgres};
use storefront_common::{DatabaseConfig, AppError};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, AppError> {
    let connection_string = config.connection_string();

    // Create database if it doesn't exist
    if !Postgres::database_exists(&connection_string).await.unwrap_or(false) {
        tracing::info!("Creating database: {}", config.database);
        Postgres::create_database(&connection_string).await?;
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&connection_string)
        .await?;

    // Test the connection
    sqlx::query("SELECT 1").execute(&pool).await?;

    tracing::info!(
        host = %config.host,
        database = %config.database,
        "Database connection established"
    );
    Ok(pool)
}
