//! Signing key repository.

use sqlx::PgPool;
use tracing::info;

use filehub_core::error::{AppError, ErrorKind};
use filehub_core::result::AppResult;
use filehub_core::types::SigningKeyId;
use filehub_entity::signing_key::SigningKey;

/// Repository for the token signing key pool.
#[derive(Debug, Clone)]
pub struct SigningKeyRepository {
    pool: PgPool,
}

impl SigningKeyRepository {
    /// Create a new signing key repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load every stored key, oldest first.
    pub async fn find_all(&self) -> AppResult<Vec<SigningKey>> {
        sqlx::query_as::<_, SigningKey>("SELECT * FROM signing_keys ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load signing keys", e)
            })
    }

    /// Persist `secrets` as a new pool, unless a pool already exists.
    ///
    /// The table is locked for the duration of the check-and-insert so
    /// concurrent first startups cannot both write a pool. Returns the
    /// number of keys inserted.
    pub async fn insert_if_empty(&self, secrets: &[String]) -> AppResult<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin signing key transaction"))?;

        sqlx::query("LOCK TABLE signing_keys IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to lock signing keys"))?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM signing_keys")
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count signing keys"))?;

        if existing > 0 {
            tx.rollback()
                .await
                .map_err(db_error("Failed to release signing key lock"))?;
            return Ok(0);
        }

        for secret in secrets {
            sqlx::query("INSERT INTO signing_keys (id, secret) VALUES ($1, $2)")
                .bind(SigningKeyId::new())
                .bind(secret)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to insert signing key"))?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit signing keys"))?;

        info!(count = secrets.len(), "Persisted new signing key pool");
        Ok(secrets.len())
    }
}

fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}
