//! Password KDF versions.
//!
//! Every stored hash carries the tag of the version that produced it, so
//! adding a version never invalidates existing rows. Salt and hash are
//! stored base64-encoded in separate columns.

use argon2::Argon2;
use argon2::password_hash::Output;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use filehub_core::error::AppError;

/// Salt length in bytes, shared by all versions.
const SALT_LEN: usize = 16;

/// Derived hash length in bytes, shared by all versions.
const HASH_LEN: usize = 32;

/// Rounds of the legacy iterated SHA-256 scheme.
const V1_ROUNDS: u32 = 10_000;

/// A known password hashing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashVersion {
    /// Legacy salted, iterated SHA-256. Verification only in practice.
    V1,
    /// Argon2id with default parameters.
    V2,
}

/// Output of hashing a password under a specific version.
#[derive(Debug, Clone)]
pub struct HashedPassword {
    /// The version that produced the hash.
    pub version: HashVersion,
    /// Base64 salt.
    pub salt: String,
    /// Base64 hash.
    pub hash: String,
}

impl HashVersion {
    /// The strongest known version.
    pub const LATEST: HashVersion = HashVersion::V2;

    /// Tag stored alongside the hash.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::V1 => "1",
            Self::V2 => "2",
        }
    }

    /// Resolves a stored tag. Unknown tags resolve to `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "1" => Some(Self::V1),
            "2" => Some(Self::V2),
            _ => None,
        }
    }

    /// Hashes `password` under a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<HashedPassword, AppError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let hash = self.derive(password, &salt)?;

        Ok(HashedPassword {
            version: *self,
            salt: STANDARD.encode(salt),
            hash: STANDARD.encode(hash),
        })
    }

    /// Checks `password` against a stored salt and hash.
    ///
    /// Never fails: undecodable or wrongly sized input is a non-match. The
    /// final comparison is constant-time.
    pub fn check_password(&self, password: &str, salt: &str, hash: &str) -> bool {
        let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt), STANDARD.decode(hash)) else {
            return false;
        };
        if salt.is_empty() || expected.len() != HASH_LEN {
            return false;
        }

        let Ok(actual) = self.derive(password, &salt) else {
            return false;
        };

        match (Output::new(&actual), Output::new(&expected)) {
            (Ok(actual), Ok(expected)) => actual == expected,
            _ => false,
        }
    }

    /// Runs the KDF. Used directly to burn equivalent time for unknown users.
    pub(crate) fn derive(&self, password: &str, salt: &[u8]) -> Result<[u8; HASH_LEN], AppError> {
        let mut out = [0u8; HASH_LEN];
        match self {
            Self::V1 => {
                let mut digest = Sha256::new()
                    .chain_update(salt)
                    .chain_update(password.as_bytes())
                    .finalize();
                for _ in 1..V1_ROUNDS {
                    digest = Sha256::new()
                        .chain_update(&digest)
                        .chain_update(salt)
                        .finalize();
                }
                out.copy_from_slice(&digest);
            }
            Self::V2 => {
                Argon2::default()
                    .hash_password_into(password.as_bytes(), salt, &mut out)
                    .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
            }
        }
        Ok(out)
    }
}

impl std::fmt::Display for HashVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}
