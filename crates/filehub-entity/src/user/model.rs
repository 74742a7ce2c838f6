//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use filehub_core::types::OwnerId;

/// A registered user.
///
/// `username` is the lookup key and may be renamed; `owner_id` is fixed at
/// creation and is what stored resources reference.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique login name.
    pub username: String,
    /// Immutable identity anchor.
    pub owner_id: OwnerId,
    /// Tag of the password KDF that produced `hash`.
    pub hash_version: String,
    /// Base64 salt.
    #[serde(skip_serializing)]
    pub salt: String,
    /// Base64 password hash.
    #[serde(skip_serializing)]
    pub hash: String,
    /// Administrators bypass every permission check.
    pub admin: bool,
    /// Free-form metadata.
    pub meta: serde_json::Value,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Desired username.
    pub username: String,
    /// Freshly generated identity anchor.
    pub owner_id: OwnerId,
    /// Hash version tag.
    pub hash_version: String,
    /// Base64 salt.
    pub salt: String,
    /// Base64 password hash.
    pub hash: String,
    /// Initial admin flag.
    pub admin: bool,
    /// Free-form metadata.
    pub meta: serde_json::Value,
}

impl User {
    /// Name of the synthetic per-user root directory.
    pub fn home_directory(&self) -> String {
        home_directory(&self.owner_id)
    }
}

/// Returns `user_<ownerId>`, the root directory owned by `owner_id`.
pub fn home_directory(owner_id: &OwnerId) -> String {
    format!("user_{owner_id}")
}
