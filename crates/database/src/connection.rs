use crate::error::DbError;
use configuration::DatabaseConfig;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::time::Duration;

/// Establishes a connection pool to the SQLite store.
///
/// The pool can be shared across the entire application; SQLite serializes
/// writers internally, and the repository keeps every multi-row mutation
/// inside an explicit transaction.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DbError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.url)
        .await?;

    Ok(pool)
}

/// A utility function to run database migrations automatically.
///
/// This is useful for ensuring the schema is up-to-date when the application
/// starts, which is especially important in production deployments.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
