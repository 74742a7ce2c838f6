//! Register and login flows over the identity store.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use filehub_core::error::AppError;
use filehub_core::types::OwnerId;
use filehub_database::store::IdentityStore;
use filehub_entity::user::{NewUser, User};

use crate::jwt::TokenService;
use crate::lockout::LockoutTracker;
use crate::password::{PasswordHashingRegistry, PasswordValidator};
use crate::permission::Actor;

/// Maximum username length in characters.
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}

/// Orchestrates hashing, lockout, and token issuance.
pub struct Authenticator {
    store: Arc<dyn IdentityStore>,
    hashing: PasswordHashingRegistry,
    validator: PasswordValidator,
    lockout: LockoutTracker,
    tokens: Arc<TokenService>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("hashing", &self.hashing)
            .field("lockout", &self.lockout)
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl Authenticator {
    /// Creates an authenticator.
    pub fn new(
        store: Arc<dyn IdentityStore>,
        hashing: PasswordHashingRegistry,
        validator: PasswordValidator,
        lockout: LockoutTracker,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            store,
            hashing,
            validator,
            lockout,
            tokens,
        }
    }

    /// The token service used for issuing and verifying tokens.
    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// The failed-login tracker.
    pub fn lockout(&self) -> &LockoutTracker {
        &self.lockout
    }

    /// Creates a non-admin user with a fresh owner id.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        meta: serde_json::Value,
    ) -> Result<User, AppError> {
        validate_username(username)?;
        self.validator.validate(username, password)?;

        let hashed = self.hashing.hash_password(password)?;
        let user = self
            .store
            .add_user(&NewUser {
                username: username.to_string(),
                owner_id: OwnerId::new(),
                hash_version: hashed.version.tag().to_string(),
                salt: hashed.salt,
                hash: hashed.hash,
                admin: false,
                meta,
            })
            .await?;

        info!(username = %user.username, owner_id = %user.owner_id, "User registered");
        Ok(user)
    }

    /// Performs the login flow:
    ///
    /// 1. Reject outright while the lockout window is active
    /// 2. Look the user up and verify the password
    /// 3. On failure, count an attempt (unknown users included)
    /// 4. On success, reset attempts, migrate an old hash, issue a token
    ///
    /// Unknown users and wrong passwords yield the same error. Any store
    /// failure rejects the login.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AppError> {
        if username.is_empty() {
            return Err(AppError::invalid_credentials());
        }

        if self.lockout.handle_locking(username).await? {
            return Err(AppError::locked_out());
        }

        let user = self.store.get_user(username).await?;
        let verified = match &user {
            Some(user) => self.hashing.check_password(
                &user.hash_version,
                password,
                &user.salt,
                &user.hash,
            ),
            None => {
                self.hashing.decoy_check(password);
                false
            }
        };

        let user = match user {
            Some(user) if verified => user,
            _ => {
                self.lockout.count_attempt(username).await?;
                info!(username = %username, "Login failed");
                return Err(AppError::invalid_credentials());
            }
        };

        self.lockout.reset_attempts(username).await?;
        let user = self.migrate_hash(user, password).await;
        let token = self.tokens.issue_token(&user.username)?;

        info!(username = %user.username, "Login successful");
        Ok(LoginResult { token, user })
    }

    /// Re-hashes under the current version if the stored one is older.
    ///
    /// Failures are logged and the login proceeds with the old hash.
    async fn migrate_hash(&self, mut user: User, password: &str) -> User {
        if !self.hashing.needs_rehash(&user.hash_version) {
            return user;
        }

        let hashed = match self.hashing.hash_password(password) {
            Ok(hashed) => hashed,
            Err(e) => {
                warn!(username = %user.username, error = %e, "Password re-hash failed");
                return user;
            }
        };
        let version = hashed.version.tag();

        match self
            .store
            .update_hash(&user.username, version, &hashed.salt, &hashed.hash)
            .await
        {
            Ok(()) => {
                info!(
                    username = %user.username,
                    from = %user.hash_version,
                    to = version,
                    "Password hash migrated"
                );
                user.hash_version = version.to_string();
                user.salt = hashed.salt;
                user.hash = hashed.hash;
            }
            Err(e) => {
                warn!(username = %user.username, error = %e, "Failed to persist migrated hash");
            }
        }
        user
    }

    /// Resolves a bearer token to the current user.
    ///
    /// A missing token, an invalid token, and a token whose user no longer
    /// exists all yield [`AppError::invalid_token`].
    pub async fn authenticate(&self, token: Option<&str>) -> Result<User, AppError> {
        let token = token.ok_or_else(AppError::invalid_token)?;
        let username = self.tokens.verify_token(token)?;
        self.store
            .get_user(&username)
            .await?
            .ok_or_else(AppError::invalid_token)
    }

    /// Resolves an optional bearer token to an actor. No token is anonymous.
    pub async fn actor(&self, token: Option<&str>) -> Result<Actor, AppError> {
        match token {
            None => Ok(Actor::Anonymous),
            Some(token) => Ok(Actor::from(&self.authenticate(Some(token)).await?)),
        }
    }

    /// Replaces a password after verifying the current one.
    ///
    /// Goes through the same lockout and attempt counting as login.
    pub async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if self.lockout.handle_locking(username).await? {
            return Err(AppError::locked_out());
        }

        let user = self.store.get_user(username).await?;
        let verified = user.as_ref().is_some_and(|u| {
            self.hashing
                .check_password(&u.hash_version, old_password, &u.salt, &u.hash)
        });
        if !verified {
            if user.is_none() {
                self.hashing.decoy_check(old_password);
            }
            self.lockout.count_attempt(username).await?;
            return Err(AppError::invalid_credentials());
        }

        self.validator.validate_not_same(old_password, new_password)?;
        self.validator.validate(username, new_password)?;

        let hashed = self.hashing.hash_password(new_password)?;
        self.store
            .update_hash(username, hashed.version.tag(), &hashed.salt, &hashed.hash)
            .await?;
        self.lockout.reset_attempts(username).await?;

        info!(username = %username, "Password changed");
        Ok(())
    }

    /// Grants or revokes administrator status.
    pub async fn set_admin(&self, username: &str, admin: bool) -> Result<(), AppError> {
        self.store.set_admin_state(username, admin).await?;
        info!(username = %username, admin, "Administrator status changed");
        Ok(())
    }
}

/// Checks a username chosen at registration.
///
/// 1 to 64 characters of ASCII letters, digits, `.`, `_` or `-`.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AppError::validation(format!(
            "Username must be between 1 and {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(AppError::validation(
            "Username may only contain letters, digits, '.', '_' and '-'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a.b_c-9").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("slash/name").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
    }
}
