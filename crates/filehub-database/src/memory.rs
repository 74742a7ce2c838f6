//! In-process identity store.
//!
//! Used by tests and single-node deployments without PostgreSQL. Writes can
//! be made to fail on demand to exercise fail-closed paths.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::RwLock;

use filehub_core::error::AppError;
use filehub_core::result::AppResult;
use filehub_core::types::SigningKeyId;
use filehub_entity::signing_key::SigningKey;
use filehub_entity::user::{FailedLoginAttempts, NewUser, User};

use crate::store::IdentityStore;

/// Identity store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    users: DashMap<String, User>,
    attempts: DashMap<String, FailedLoginAttempts>,
    keys: RwLock<Vec<SigningKey>>,
    fail_writes: AtomicBool,
}

impl MemoryIdentityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a database error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("Identity store is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn get_user(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.users.get(username).map(|u| u.value().clone()))
    }

    async fn add_user(&self, user: &NewUser) -> AppResult<User> {
        self.check_writable()?;
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Username '{}' already exists",
                user.username
            ))),
            Entry::Vacant(slot) => {
                let created = User {
                    username: user.username.clone(),
                    owner_id: user.owner_id,
                    hash_version: user.hash_version.clone(),
                    salt: user.salt.clone(),
                    hash: user.hash.clone(),
                    admin: user.admin,
                    meta: user.meta.clone(),
                    created_at: Utc::now(),
                };
                slot.insert(created.clone());
                Ok(created)
            }
        }
    }

    async fn update_hash(
        &self,
        username: &str,
        hash_version: &str,
        salt: &str,
        hash: &str,
    ) -> AppResult<()> {
        self.check_writable()?;
        let mut user = self
            .users
            .get_mut(username)
            .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))?;
        user.hash_version = hash_version.to_string();
        user.salt = salt.to_string();
        user.hash = hash.to_string();
        Ok(())
    }

    async fn set_admin_state(&self, username: &str, admin: bool) -> AppResult<()> {
        self.check_writable()?;
        let mut user = self
            .users
            .get_mut(username)
            .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))?;
        user.admin = admin;
        Ok(())
    }

    async fn get_login_attempts(&self, username: &str) -> AppResult<Option<FailedLoginAttempts>> {
        Ok(self.attempts.get(username).map(|a| a.value().clone()))
    }

    async fn count_login_attempt(&self, username: &str, at: DateTime<Utc>) -> AppResult<()> {
        self.check_writable()?;
        self.attempts
            .entry(username.to_string())
            .and_modify(|a| {
                a.attempts = a.attempts.saturating_add(1);
                a.last_attempt = at;
            })
            .or_insert_with(|| FailedLoginAttempts {
                username: username.to_string(),
                attempts: 1,
                last_attempt: at,
            });
        Ok(())
    }

    async fn update_last_login_attempt(
        &self,
        username: &str,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.check_writable()?;
        if let Some(mut row) = self.attempts.get_mut(username) {
            row.last_attempt = at;
        }
        Ok(())
    }

    async fn remove_login_attempts(&self, username: &str) -> AppResult<()> {
        self.check_writable()?;
        self.attempts.remove(username);
        Ok(())
    }

    async fn prune_unknown_login_attempts(&self, before: DateTime<Utc>) -> AppResult<u64> {
        self.check_writable()?;
        let mut removed = 0;
        self.attempts.retain(|username, row| {
            let keep = row.last_attempt >= before || self.users.contains_key(username);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn get_signing_keys(&self) -> AppResult<Vec<SigningKey>> {
        Ok(self.keys.read().await.clone())
    }

    async fn add_signing_keys(&self, secrets: &[String]) -> AppResult<()> {
        self.check_writable()?;
        let mut keys = self.keys.write().await;
        if !keys.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        keys.extend(secrets.iter().map(|secret| SigningKey {
            id: SigningKeyId::new(),
            secret: secret.clone(),
            created_at: now,
        }));
        Ok(())
    }
}
