//! The password hashing registry.

use tracing::debug;

use filehub_core::error::AppError;

use super::version::{HashVersion, HashedPassword};

/// Fixed salt for the decoy hash run against unknown usernames.
const DECOY_SALT: [u8; 16] = *b"filehub-decoy-01";

/// Resolves stored hash versions and hashes new passwords under the
/// current one.
#[derive(Debug, Clone)]
pub struct PasswordHashingRegistry {
    /// Version used for every new hash.
    current: HashVersion,
}

impl PasswordHashingRegistry {
    /// Creates a registry whose current version is the strongest known one.
    pub fn new() -> Self {
        Self {
            current: HashVersion::LATEST,
        }
    }

    /// Creates a registry hashing new passwords under `current`.
    pub fn with_current(current: HashVersion) -> Self {
        Self { current }
    }

    /// The version new hashes are produced with.
    pub fn current(&self) -> HashVersion {
        self.current
    }

    /// Hashes a password under the current version with a fresh salt.
    pub fn hash_password(&self, password: &str) -> Result<HashedPassword, AppError> {
        self.current.hash_password(password)
    }

    /// Checks a password against a stored `(version, salt, hash)` triple.
    ///
    /// Unknown version tags and malformed data are non-matches.
    pub fn check_password(&self, version: &str, password: &str, salt: &str, hash: &str) -> bool {
        match HashVersion::from_tag(version) {
            Some(v) => v.check_password(password, salt, hash),
            None => {
                debug!(version = %version, "Stored hash has an unknown version tag");
                false
            }
        }
    }

    /// Whether a hash stored under `version` should be migrated.
    pub fn needs_rehash(&self, version: &str) -> bool {
        version != self.current.tag()
    }

    /// Spends the same work as a real check without a stored hash.
    ///
    /// Called for unknown usernames so response time does not reveal
    /// whether an account exists.
    pub fn decoy_check(&self, password: &str) {
        let _ = self.current.derive(password, &DECOY_SALT);
    }
}

impl Default for PasswordHashingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
