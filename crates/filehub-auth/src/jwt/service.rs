//! Token issuance and verification.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, Header, Validation, decode, decode_header, encode};
use tokio::sync::watch;
use tracing::{debug, info};

use filehub_core::config::AuthConfig;
use filehub_core::error::AppError;
use filehub_core::traits::Clock;
use filehub_core::types::SigningKeyId;
use filehub_database::store::IdentityStore;

use super::claims::Claims;
use super::keys::SigningKeyPool;

/// The only accepted signing algorithm.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and verifies bearer tokens against the loaded key pool.
///
/// The pool is read through a `watch` channel: every call takes a snapshot,
/// and [`TokenService::reload`] swaps in a new pool atomically.
pub struct TokenService {
    pool: watch::Sender<Arc<SigningKeyPool>>,
    store: Arc<dyn IdentityStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &self.pool.borrow().len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// Loads (or creates) the key pool and builds the service.
    ///
    /// Must complete before any token is issued or verified.
    pub async fn initialize(
        config: &AuthConfig,
        store: Arc<dyn IdentityStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let pool = SigningKeyPool::load_or_init(store.as_ref(), config.signing_key_count).await?;
        info!(keys = pool.len(), "Token signing key pool loaded");
        Self::with_pool(pool, config, store, clock)
    }

    /// Builds the service around an already loaded pool.
    pub fn with_pool(
        pool: SigningKeyPool,
        config: &AuthConfig,
        store: Arc<dyn IdentityStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        if config.token_ttl_seconds == 0 {
            return Err(AppError::configuration("token_ttl_seconds must be positive"));
        }
        let ttl = i64::try_from(config.token_ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| AppError::configuration("token_ttl_seconds is out of range"))?;

        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against `iat` and our own clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let (pool, _) = watch::channel(Arc::new(pool));

        Ok(Self {
            pool,
            store,
            clock,
            ttl,
            validation,
        })
    }

    /// Signs `{sub, iat}` with a key chosen uniformly at random.
    pub fn issue_token(&self, subject: &str) -> Result<String, AppError> {
        let pool = self.pool.borrow().clone();
        let key = pool
            .choose()
            .ok_or_else(|| AppError::internal("Signing key pool is empty"))?;

        let mut header = Header::new(ALGORITHM);
        header.kid = Some(key.kid.clone());

        let claims = Claims {
            sub: subject.to_string(),
            iat: self.clock.now().timestamp(),
        };

        encode(&header, &claims, &key.encoding)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }

    /// Verifies a token and returns its subject.
    ///
    /// Every failure yields the same [`AppError::invalid_token`]; the
    /// reason is only logged at debug level.
    pub fn verify_token(&self, token: &str) -> Result<String, AppError> {
        self.verify_claims(token)
            .map(|claims| claims.sub)
            .map_err(|reason| {
                debug!(reason, "Rejected bearer token");
                AppError::invalid_token()
            })
    }

    fn verify_claims(&self, token: &str) -> Result<Claims, &'static str> {
        if token.trim().is_empty() {
            return Err("empty");
        }

        // The header is read before the signature is trusted, only to pick a key.
        let header = decode_header(token).map_err(|_| "malformed header")?;
        if header.alg != ALGORITHM {
            return Err("unsupported algorithm");
        }
        let kid = header.kid.ok_or("missing kid")?;

        let pool = self.pool.borrow().clone();
        let key = pool.find(&kid).ok_or("unknown kid")?;

        let data = decode::<Claims>(token, &key.decoding, &self.validation)
            .map_err(|_| "bad signature or claims")?;

        if !data
            .claims
            .is_fresh(self.clock.now().timestamp(), self.ttl.num_seconds())
        {
            return Err("expired");
        }

        Ok(data.claims)
    }

    /// Re-reads the pool from the store and swaps it in.
    ///
    /// On error the current pool stays in place. Returns the new key count.
    pub async fn reload(&self) -> Result<usize, AppError> {
        let stored = self.store.get_signing_keys().await?;
        let pool = SigningKeyPool::from_keys(&stored)?;
        let count = pool.len();
        self.pool.send_replace(Arc::new(pool));
        info!(keys = count, "Token signing key pool reloaded");
        Ok(count)
    }

    /// Identifiers of the keys currently in use.
    pub fn key_ids(&self) -> Vec<SigningKeyId> {
        self.pool.borrow().key_ids()
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filehub_core::error::ErrorKind;
    use filehub_core::traits::SystemClock;
    use filehub_database::MemoryIdentityStore;
    use filehub_entity::signing_key::SigningKey;

    use crate::jwt::keys::generate_secrets;

    fn pool() -> SigningKeyPool {
        let stored: Vec<_> = generate_secrets(2)
            .into_iter()
            .map(|secret| SigningKey {
                id: SigningKeyId::new(),
                secret,
                created_at: chrono::Utc::now(),
            })
            .collect();
        SigningKeyPool::from_keys(&stored).unwrap()
    }

    fn build(ttl_seconds: u64) -> Result<TokenService, AppError> {
        let config = AuthConfig {
            token_ttl_seconds: ttl_seconds,
            ..AuthConfig::default()
        };
        TokenService::with_pool(
            pool(),
            &config,
            Arc::new(MemoryIdentityStore::new()),
            Arc::new(SystemClock),
        )
    }

    #[test]
    fn test_ttl_out_of_range_is_configuration_error() {
        for ttl in [0, i64::MAX as u64, u64::MAX] {
            let err = build(ttl).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Configuration, "ttl {ttl}");
        }
    }

    #[test]
    fn test_ttl_from_config() {
        let service = build(90).unwrap();
        assert_eq!(service.ttl(), Duration::seconds(90));
        assert_eq!(service.key_ids().len(), 2);
    }
}
