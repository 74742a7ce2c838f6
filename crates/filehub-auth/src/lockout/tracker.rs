//! Per-username failed attempt bookkeeping.

use std::sync::Arc;

use tracing::{debug, warn};

use filehub_core::result::AppResult;
use filehub_core::traits::Clock;
use filehub_database::store::IdentityStore;

use super::policy::LockoutPolicy;

/// Tracks failed logins and decides whether a username is currently locked.
///
/// Read-then-write races between concurrent attempts for the same username
/// may lose an increment; the window is still entered.
pub struct LockoutTracker {
    store: Arc<dyn IdentityStore>,
    clock: Arc<dyn Clock>,
    policy: LockoutPolicy,
}

impl std::fmt::Debug for LockoutTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockoutTracker")
            .field("policy", &self.policy)
            .finish()
    }
}

impl LockoutTracker {
    /// Creates a tracker.
    pub fn new(
        store: Arc<dyn IdentityStore>,
        clock: Arc<dyn Clock>,
        policy: LockoutPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// The policy in effect.
    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Records a failed attempt, creating the counter if absent.
    pub async fn count_attempt(&self, username: &str) -> AppResult<()> {
        self.store
            .count_login_attempt(username, self.clock.now())
            .await?;
        debug!(username = %username, "Failed login attempt recorded");
        Ok(())
    }

    /// Forgets all failed attempts. Only called after a successful login.
    pub async fn reset_attempts(&self, username: &str) -> AppResult<()> {
        self.store.remove_login_attempts(username).await
    }

    /// Deletes counters of usernames without an account once they are older
    /// than the retention. Counters of existing accounts are never pruned.
    pub async fn prune_unknown_attempts(&self) -> AppResult<u64> {
        let before = self.clock.now() - self.policy.unknown_user_retention();
        let removed = self.store.prune_unknown_login_attempts(before).await?;
        if removed > 0 {
            debug!(removed, "Pruned login attempts of unknown usernames");
        }
        Ok(removed)
    }

    /// Returns `true` while the backoff window is active.
    ///
    /// An active lock slides: `last_attempt` is moved to now. An expired
    /// lock leaves the counter and timestamp untouched.
    pub async fn handle_locking(&self, username: &str) -> AppResult<bool> {
        let Some(record) = self.store.get_login_attempts(username).await? else {
            return Ok(false);
        };

        let attempts = record.count();
        let Some(window) = self.policy.window(attempts) else {
            return Ok(false);
        };

        let now = self.clock.now();
        if now.signed_duration_since(record.last_attempt) >= window {
            debug!(username = %username, attempts, "Lockout window expired");
            return Ok(false);
        }

        self.store.update_last_login_attempt(username, now).await?;
        warn!(
            username = %username,
            attempts,
            window_secs = window.num_seconds(),
            "Login rejected, account temporarily locked"
        );
        Ok(true)
    }
}
