//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Bearer token lifetime in seconds, counted from `iat`.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
    /// Number of signing keys in the rotating pool.
    #[serde(default = "default_signing_key_count")]
    pub signing_key_count: usize,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn strength score (0..=4) for new passwords.
    #[serde(default = "default_password_strength")]
    pub password_min_strength: u8,
    /// Failed-login lockout settings.
    #[serde(default)]
    pub lockout: LockoutConfig,
}

/// Failed-login lockout with exponential backoff.
///
/// The window is `ttl_min * 2^(attempts - threshold)`, clamped to
/// `[ttl_min, ttl_max]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Attempt count at which the backoff window starts applying.
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// Smallest lockout window in seconds.
    #[serde(default = "default_ttl_min")]
    pub ttl_min_seconds: u64,
    /// Largest lockout window in seconds.
    #[serde(default = "default_ttl_max")]
    pub ttl_max_seconds: u64,
    /// Age in seconds after which counters for usernames without an account
    /// are deleted. Must not be shorter than `ttl_max_seconds`.
    #[serde(default = "default_unknown_user_retention")]
    pub unknown_user_retention_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_seconds: default_token_ttl(),
            signing_key_count: default_signing_key_count(),
            password_min_length: default_password_min(),
            password_min_strength: default_password_strength(),
            lockout: LockoutConfig::default(),
        }
    }
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            ttl_min_seconds: default_ttl_min(),
            ttl_max_seconds: default_ttl_max(),
            unknown_user_retention_seconds: default_unknown_user_retention(),
        }
    }
}

fn default_token_ttl() -> u64 {
    86_400
}

fn default_signing_key_count() -> usize {
    8
}

fn default_password_min() -> usize {
    8
}

fn default_password_strength() -> u8 {
    2
}

fn default_threshold() -> u32 {
    5
}

fn default_ttl_min() -> u64 {
    30
}

fn default_ttl_max() -> u64 {
    3_600
}

fn default_unknown_user_retention() -> u64 {
    86_400
}
