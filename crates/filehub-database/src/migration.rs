//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use filehub_core::error::{AppError, ErrorKind};

/// Run all pending identity schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running identity schema migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Identity schema is up to date");
    Ok(())
}
