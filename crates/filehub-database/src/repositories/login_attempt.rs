//! Failed login attempt repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use filehub_core::error::{AppError, ErrorKind};
use filehub_core::result::AppResult;
use filehub_entity::user::FailedLoginAttempts;

/// Repository for per-username failed login counters.
#[derive(Debug, Clone)]
pub struct LoginAttemptRepository {
    pool: PgPool,
}

impl LoginAttemptRepository {
    /// Create a new login attempt repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the counter for a username.
    pub async fn find(&self, username: &str) -> AppResult<Option<FailedLoginAttempts>> {
        sqlx::query_as::<_, FailedLoginAttempts>(
            "SELECT * FROM failed_login_attempts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load login attempts", e)
        })
    }

    /// Increment the counter, creating it on the first failure.
    pub async fn increment(&self, username: &str, at: DateTime<Utc>) -> AppResult<i32> {
        let row: (i32,) = sqlx::query_as(
            "INSERT INTO failed_login_attempts (username, attempts, last_attempt) \
             VALUES ($1, 1, $2) \
             ON CONFLICT (username) DO UPDATE \
             SET attempts = failed_login_attempts.attempts + 1, \
                 last_attempt = EXCLUDED.last_attempt \
             RETURNING attempts",
        )
        .bind(username)
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count login attempt", e)
        })?;

        Ok(row.0)
    }

    /// Move `last_attempt` forward without touching the counter.
    pub async fn touch(&self, username: &str, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE failed_login_attempts SET last_attempt = $2 WHERE username = $1")
            .bind(username)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last attempt", e)
            })?;
        Ok(())
    }

    /// Delete the counter.
    pub async fn delete(&self, username: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM failed_login_attempts WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to remove login attempts", e)
            })?;
        Ok(())
    }

    /// Delete counters for usernames without an account whose last attempt
    /// is older than `before`.
    pub async fn delete_unknown_before(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM failed_login_attempts a \
             WHERE a.last_attempt < $1 \
             AND NOT EXISTS (SELECT 1 FROM users u WHERE u.username = a.username)",
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to prune login attempts", e)
        })?;
        Ok(result.rows_affected())
    }
}
