//! Failed login attempt bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Failed login counter for one username.
///
/// Created on the first failed attempt and deleted on a successful login.
/// Keyed by username, so attempts against unknown accounts are tracked too.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FailedLoginAttempts {
    /// The username the attempts were made against.
    pub username: String,
    /// Number of failed attempts since the last successful login.
    pub attempts: i32,
    /// Time of the most recent failed (or locked-out) attempt.
    pub last_attempt: DateTime<Utc>,
}

impl FailedLoginAttempts {
    /// The attempt counter as an unsigned count.
    pub fn count(&self) -> u32 {
        u32::try_from(self.attempts).unwrap_or(0)
    }
}
