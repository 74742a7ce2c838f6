//! User repository implementation.

use sqlx::PgPool;

use filehub_core::error::{AppError, ErrorKind};
use filehub_core::result::AppResult;
use filehub_entity::user::{NewUser, User};

/// Repository for user rows.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    /// Insert a new user.
    pub async fn create(&self, data: &NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, owner_id, hash_version, salt, hash, admin, meta) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(&data.username)
        .bind(data.owner_id)
        .bind(&data.hash_version)
        .bind(&data.salt)
        .bind(&data.hash)
        .bind(data.admin)
        .bind(&data.meta)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("users_username_key") =>
            {
                AppError::conflict(format!("Username '{}' already exists", data.username))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    /// Replace a user's password hash and the version that produced it.
    pub async fn update_hash(
        &self,
        username: &str,
        hash_version: &str,
        salt: &str,
        hash: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET hash_version = $2, salt = $3, hash = $4 WHERE username = $1",
        )
        .bind(username)
        .bind(hash_version)
        .bind(salt)
        .bind(hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update hash", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User '{username}' not found")));
        }
        Ok(())
    }

    /// Grant or revoke administrator status.
    pub async fn set_admin(&self, username: &str, admin: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET admin = $2 WHERE username = $1")
            .bind(username)
            .bind(admin)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update admin state", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User '{username}' not found")));
        }
        Ok(())
    }
}
