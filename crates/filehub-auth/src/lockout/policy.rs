//! Backoff window computation.

use chrono::Duration;

use filehub_core::config::LockoutConfig;
use filehub_core::error::AppError;

/// Default age after which counters for unknown usernames are pruned.
const UNKNOWN_USER_RETENTION_SECS: i64 = 86_400;

/// Threshold and window bounds of the lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    threshold: u32,
    ttl_min: Duration,
    ttl_max: Duration,
    unknown_user_retention: Duration,
}

impl LockoutPolicy {
    /// Creates a policy. Requires `threshold >= 1` and `0 < ttl_min <= ttl_max`.
    pub fn new(threshold: u32, ttl_min: Duration, ttl_max: Duration) -> Result<Self, AppError> {
        if threshold == 0 {
            return Err(AppError::configuration(
                "Lockout threshold must be at least 1",
            ));
        }
        if ttl_min <= Duration::zero() || ttl_min > ttl_max {
            return Err(AppError::configuration(format!(
                "Lockout window bounds are inconsistent: min {}s, max {}s",
                ttl_min.num_seconds(),
                ttl_max.num_seconds()
            )));
        }
        Ok(Self {
            threshold,
            ttl_min,
            ttl_max,
            unknown_user_retention: Duration::seconds(UNKNOWN_USER_RETENTION_SECS)
                .max(ttl_max),
        })
    }

    /// Sets how long counters for usernames without an account are kept.
    /// Must be at least `ttl_max` so pruning never lifts an active lock.
    pub fn with_unknown_user_retention(mut self, retention: Duration) -> Result<Self, AppError> {
        if retention < self.ttl_max {
            return Err(AppError::configuration(format!(
                "Unknown user retention {}s is shorter than the largest lockout window {}s",
                retention.num_seconds(),
                self.ttl_max.num_seconds()
            )));
        }
        self.unknown_user_retention = retention;
        Ok(self)
    }

    /// Builds the policy from configuration.
    pub fn from_config(config: &LockoutConfig) -> Result<Self, AppError> {
        let seconds = |value: u64, name: &str| {
            i64::try_from(value)
                .ok()
                .and_then(Duration::try_seconds)
                .ok_or_else(|| AppError::configuration(format!("{name} is out of range")))
        };
        Self::new(
            config.threshold,
            seconds(config.ttl_min_seconds, "lockout.ttl_min_seconds")?,
            seconds(config.ttl_max_seconds, "lockout.ttl_max_seconds")?,
        )?
        .with_unknown_user_retention(seconds(
            config.unknown_user_retention_seconds,
            "lockout.unknown_user_retention_seconds",
        )?)
    }

    /// Attempt count at which locking starts.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// How long counters for usernames without an account are kept.
    pub fn unknown_user_retention(&self) -> Duration {
        self.unknown_user_retention
    }

    /// Lockout window for a given attempt count, `None` below the threshold.
    ///
    /// `ttl_min * 2^(attempts - threshold)`, clamped to `[ttl_min, ttl_max]`.
    pub fn window(&self, attempts: u32) -> Option<Duration> {
        let exponent = attempts.checked_sub(self.threshold)?;

        let window = 1i64
            .checked_shl(exponent)
            .filter(|factor| *factor > 0)
            .and_then(|factor| self.ttl_min.num_milliseconds().checked_mul(factor))
            .and_then(Duration::try_milliseconds)
            .unwrap_or(self.ttl_max);

        Some(window.clamp(self.ttl_min, self.ttl_max))
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            threshold: 5,
            ttl_min: Duration::seconds(30),
            ttl_max: Duration::seconds(3_600),
            unknown_user_retention: Duration::seconds(UNKNOWN_USER_RETENTION_SECS),
        }
    }
}
