//! The identity store port consumed by `filehub-auth`.
//!
//! Users, failed login counters, and signing keys are only ever read or
//! mutated through [`IdentityStore`]. [`PgIdentityStore`] backs it with
//! PostgreSQL; [`crate::memory::MemoryIdentityStore`] keeps everything in
//! process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use filehub_core::result::AppResult;
use filehub_entity::signing_key::SigningKey;
use filehub_entity::user::{FailedLoginAttempts, NewUser, User};

use crate::repositories::{LoginAttemptRepository, SigningKeyRepository, UserRepository};

/// Persistence operations required by the identity subsystem.
#[async_trait]
pub trait IdentityStore: Send + Sync + 'static {
    /// Look a user up by username.
    async fn get_user(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a user. Fails with a conflict if the username is taken.
    async fn add_user(&self, user: &NewUser) -> AppResult<User>;

    /// Replace the stored hash, salt, and hash version of a user.
    async fn update_hash(
        &self,
        username: &str,
        hash_version: &str,
        salt: &str,
        hash: &str,
    ) -> AppResult<()>;

    /// Grant or revoke administrator status.
    async fn set_admin_state(&self, username: &str, admin: bool) -> AppResult<()>;

    /// Load the failed login counter for a username.
    async fn get_login_attempts(&self, username: &str) -> AppResult<Option<FailedLoginAttempts>>;

    /// Increment the failed login counter and set `last_attempt = at`,
    /// creating the row if absent.
    async fn count_login_attempt(&self, username: &str, at: DateTime<Utc>) -> AppResult<()>;

    /// Set `last_attempt = at` without changing the counter.
    async fn update_last_login_attempt(&self, username: &str, at: DateTime<Utc>)
    -> AppResult<()>;

    /// Delete the failed login counter.
    async fn remove_login_attempts(&self, username: &str) -> AppResult<()>;

    /// Delete counters older than `before` whose username has no account.
    /// Returns the number of rows removed.
    async fn prune_unknown_login_attempts(&self, before: DateTime<Utc>) -> AppResult<u64>;

    /// Load the signing key pool.
    async fn get_signing_keys(&self) -> AppResult<Vec<SigningKey>>;

    /// Persist a new signing key pool. A no-op when keys already exist.
    async fn add_signing_keys(&self, secrets: &[String]) -> AppResult<()>;
}

/// PostgreSQL-backed identity store.
#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    users: UserRepository,
    attempts: LoginAttemptRepository,
    keys: SigningKeyRepository,
}

impl PgIdentityStore {
    /// Create a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            attempts: LoginAttemptRepository::new(pool.clone()),
            keys: SigningKeyRepository::new(pool),
        }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn get_user(&self, username: &str) -> AppResult<Option<User>> {
        self.users.find_by_username(username).await
    }

    async fn add_user(&self, user: &NewUser) -> AppResult<User> {
        self.users.create(user).await
    }

    async fn update_hash(
        &self,
        username: &str,
        hash_version: &str,
        salt: &str,
        hash: &str,
    ) -> AppResult<()> {
        self.users
            .update_hash(username, hash_version, salt, hash)
            .await
    }

    async fn set_admin_state(&self, username: &str, admin: bool) -> AppResult<()> {
        self.users.set_admin(username, admin).await
    }

    async fn get_login_attempts(&self, username: &str) -> AppResult<Option<FailedLoginAttempts>> {
        self.attempts.find(username).await
    }

    async fn count_login_attempt(&self, username: &str, at: DateTime<Utc>) -> AppResult<()> {
        self.attempts.increment(username, at).await.map(|_| ())
    }

    async fn update_last_login_attempt(
        &self,
        username: &str,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.attempts.touch(username, at).await
    }

    async fn remove_login_attempts(&self, username: &str) -> AppResult<()> {
        self.attempts.delete(username).await
    }

    async fn prune_unknown_login_attempts(&self, before: DateTime<Utc>) -> AppResult<u64> {
        self.attempts.delete_unknown_before(before).await
    }

    async fn get_signing_keys(&self) -> AppResult<Vec<SigningKey>> {
        self.keys.find_all().await
    }

    async fn add_signing_keys(&self, secrets: &[String]) -> AppResult<()> {
        self.keys.insert_if_empty(secrets).await.map(|_| ())
    }
}
