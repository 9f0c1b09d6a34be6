use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to connect to the database: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("The requested record was not found in the database.")]
    NotFound,
}
