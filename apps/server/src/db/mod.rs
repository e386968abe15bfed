//! PostgreSQL pool and schema setup

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

pub type DbPool = PgPool;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens the pool. Every connection runs in UTC so `CURRENT_DATE`, the
/// default for `news.published_at`, does not depend on the host.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .max_lifetime(Some(config.max_lifetime))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("SET TIME ZONE 'UTC'").execute(conn).await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await?;

    log::info!(
        "Connected to PostgreSQL ({}..{} connections)",
        config.min_connections,
        config.max_connections
    );

    Ok(pool)
}

/// Applies pending migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;

    if let Some(latest) = MIGRATOR.iter().last() {
        log::info!("Schema at migration {} ({})", latest.version, latest.description);
    }
    Ok(())
}

/// Round trip to the database, used by the readiness probe
pub async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}
