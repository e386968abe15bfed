//! Throwaway PostgreSQL for integration tests

use profsite::db;
use sqlx::postgres::{PgPool, PgPoolOptions};
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;

/// A migrated database living as long as the value does
pub struct TestDb {
    // Dropping the handle stops the container
    _container: ContainerAsync<Postgres>,
    pub pool: PgPool,
}

impl TestDb {
    pub async fn new() -> Self {
        let container = Postgres::default()
            .start()
            .await
            .expect("Failed to start PostgreSQL container");

        let url = format!(
            "postgres://postgres:postgres@{}:{}/postgres",
            container.get_host().await.expect("Failed to get host"),
            container
                .get_host_port_ipv4(5432)
                .await
                .expect("Failed to get port"),
        );

        // Enough connections for the concurrency tests to actually overlap
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .connect(&url)
            .await
            .expect("Failed to connect to test database");

        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        TestDb {
            _container: container,
            pool,
        }
    }
}
