//! JWT claims structure.

use serde::{Deserialize, Serialize};

/// Claims carried by every bearer token.
///
/// Expiry is derived from `iat` and the configured TTL rather than
/// carried in the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username the token was issued to.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

impl Claims {
    /// Whether a token issued at `iat` is still valid at `now` given `ttl_seconds`.
    pub fn is_fresh(&self, now: i64, ttl_seconds: i64) -> bool {
        self.iat
            .checked_add(ttl_seconds)
            .is_some_and(|expires| expires >= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshness_boundary() {
        let claims = Claims {
            sub: "alice".to_string(),
            iat: 1_000,
        };
        assert!(claims.is_fresh(1_000, 60));
        assert!(claims.is_fresh(1_060, 60));
        assert!(!claims.is_fresh(1_061, 60));
    }

    #[test]
    fn test_overflowing_iat_is_not_fresh() {
        let claims = Claims {
            sub: "alice".to_string(),
            iat: i64::MAX,
        };
        assert!(!claims.is_fresh(0, 60));
    }
}
