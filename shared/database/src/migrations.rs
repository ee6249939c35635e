use sqlx::{migrate::Migrator, PgPool};
use storefront_common::AppError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub struct MigrationRunner {
    pool: PgPool,
}

impl MigrationRunner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_all_migrations(&self) -> Result<(), AppError> {
        tracing::info!("Starting database migrations...");

        MIGRATOR.run(&self.pool).await?;

        tracing::info!("All migrations completed successfully");
        Ok(())
    }

    pub async fn check_migration_status(&self) -> Result<MigrationStatus, AppError> {
        use sqlx::migrate::Migrate;

        let mut conn = self.pool.acquire().await?;
        conn.ensure_migrations_table().await?;
        let applied = conn.list_applied_migrations().await?;

        let total_migrations = MIGRATOR.migrations.len();
        let applied_count = applied.len();
        let pending_count = total_migrations.saturating_sub(applied_count);

        Ok(MigrationStatus {
            total: total_migrations,
            applied: applied_count,
            pending: pending_count,
            is_up_to_date: pending_count == 0,
        })
    }
}

#[derive(Debug)]
pub struct MigrationStatus {
    pub total: usize,
    pub applied: usize,
    pub pending: usize,
    pub is_up_to_date: bool,
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Migrations: {}/{} applied, {} pending",
            self.applied, self.total, self.pending
        )
    }
}
