//! The signing key pool.
//!
//! A fixed set of K symmetric keys, generated once when the store has
//! none and immutable afterwards. Rotation happens by replacing the stored
//! set and reloading, never by mutating a loaded pool.

use std::collections::HashSet;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::RngCore;
use tracing::{info, warn};

use filehub_core::error::AppError;
use filehub_core::types::SigningKeyId;
use filehub_database::store::IdentityStore;
use filehub_entity::signing_key::SigningKey;

/// Minimum key material per key, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// One loaded key, ready for signing and verification.
#[derive(Clone)]
pub struct PoolKey {
    /// Key identifier.
    pub id: SigningKeyId,
    /// `id` rendered as the token header `kid`.
    pub kid: String,
    pub(crate) encoding: EncodingKey,
    pub(crate) decoding: DecodingKey,
}

impl std::fmt::Debug for PoolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolKey").field("kid", &self.kid).finish()
    }
}

/// An immutable set of signing keys.
#[derive(Debug, Clone)]
pub struct SigningKeyPool {
    keys: Vec<PoolKey>,
}

impl SigningKeyPool {
    /// Builds a pool from stored keys.
    ///
    /// Fails if there are no keys, if a secret is not valid base64, if a
    /// secret is shorter than [`MIN_SECRET_BYTES`], or if two keys share an id.
    pub fn from_keys(stored: &[SigningKey]) -> Result<Self, AppError> {
        if stored.is_empty() {
            return Err(AppError::configuration("Signing key pool is empty"));
        }

        let mut seen = HashSet::new();
        let mut keys = Vec::with_capacity(stored.len());
        for key in stored {
            if !seen.insert(key.id) {
                return Err(AppError::configuration(format!(
                    "Duplicate signing key id {}",
                    key.id
                )));
            }

            let secret = STANDARD.decode(&key.secret).map_err(|e| {
                AppError::configuration(format!("Signing key {} is not valid base64: {e}", key.id))
            })?;
            if secret.len() < MIN_SECRET_BYTES {
                return Err(AppError::configuration(format!(
                    "Signing key {} has {} bytes, need at least {MIN_SECRET_BYTES}",
                    key.id,
                    secret.len()
                )));
            }

            keys.push(PoolKey {
                id: key.id,
                kid: key.id.to_string(),
                encoding: EncodingKey::from_secret(&secret),
                decoding: DecodingKey::from_secret(&secret),
            });
        }

        Ok(Self { keys })
    }

    /// Loads the pool from the store, generating and persisting `size`
    /// fresh keys first if the store has none.
    ///
    /// Always re-reads after writing, so when several processes start at
    /// once they all end up with whichever pool was persisted.
    pub async fn load_or_init(store: &dyn IdentityStore, size: usize) -> Result<Self, AppError> {
        let mut stored = store.get_signing_keys().await?;

        if stored.is_empty() {
            if size == 0 {
                return Err(AppError::configuration(
                    "signing_key_count must be at least 1",
                ));
            }
            info!(count = size, "No signing keys stored, generating a new pool");
            store.add_signing_keys(&generate_secrets(size)).await?;
            stored = store.get_signing_keys().await?;
        }

        if stored.len() != size {
            warn!(
                stored = stored.len(),
                configured = size,
                "Stored signing key count differs from configuration; using stored pool"
            );
        }

        Self::from_keys(&stored)
    }

    /// Picks a key uniformly at random.
    pub fn choose(&self) -> Option<&PoolKey> {
        self.keys.choose(&mut rand::thread_rng())
    }

    /// Finds the key with the given `kid`.
    pub fn find(&self, kid: &str) -> Option<&PoolKey> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    /// Identifiers of every key in the pool.
    pub fn key_ids(&self) -> Vec<SigningKeyId> {
        self.keys.iter().map(|k| k.id).collect()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false for a constructed pool.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Generates `count` base64-encoded 256-bit secrets from the OS RNG.
pub fn generate_secrets(count: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            let mut secret = [0u8; MIN_SECRET_BYTES];
            OsRng.fill_bytes(&mut secret);
            STANDARD.encode(secret)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use filehub_database::MemoryIdentityStore;

    fn stored_key(secret: String) -> SigningKey {
        SigningKey {
            id: SigningKeyId::new(),
            secret,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_generated_secrets_are_distinct_and_long_enough() {
        let secrets = generate_secrets(4);
        let unique: HashSet<_> = secrets.iter().collect();
        assert_eq!(unique.len(), 4);
        for secret in &secrets {
            assert_eq!(STANDARD.decode(secret).unwrap().len(), MIN_SECRET_BYTES);
        }
    }

    #[test]
    fn test_from_keys_rejects_bad_material() {
        assert!(SigningKeyPool::from_keys(&[]).is_err());
        assert!(SigningKeyPool::from_keys(&[stored_key("***".to_string())]).is_err());
        assert!(SigningKeyPool::from_keys(&[stored_key(STANDARD.encode([1u8; 8]))]).is_err());

        let key = stored_key(generate_secrets(1).remove(0));
        assert!(SigningKeyPool::from_keys(&[key.clone(), key]).is_err());
    }

    #[test]
    fn test_find_by_kid() {
        let stored: Vec<_> = generate_secrets(3).into_iter().map(stored_key).collect();
        let pool = SigningKeyPool::from_keys(&stored).unwrap();
        let kid = stored[1].id.to_string();
        assert_eq!(pool.find(&kid).map(|k| k.id), Some(stored[1].id));
        assert!(pool.find("unknown").is_none());
        assert_eq!(pool.len(), 3);
    }

    #[tokio::test]
    async fn test_load_or_init_generates_once() {
        let store = MemoryIdentityStore::new();

        let first = SigningKeyPool::load_or_init(&store, 4).await.unwrap();
        assert_eq!(first.len(), 4);

        let second = SigningKeyPool::load_or_init(&store, 4).await.unwrap();
        assert_eq!(first.key_ids(), second.key_ids());
    }

    #[tokio::test]
    async fn test_concurrent_init_converges_on_one_pool() {
        let store = std::sync::Arc::new(MemoryIdentityStore::new());

        let a = tokio::spawn({
            let store = store.clone();
            async move { SigningKeyPool::load_or_init(store.as_ref(), 4).await }
        });
        let b = tokio::spawn({
            let store = store.clone();
            async move { SigningKeyPool::load_or_init(store.as_ref(), 4).await }
        });

        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();
        assert_eq!(a.key_ids(), b.key_ids());
        assert_eq!(store.get_signing_keys().await.unwrap().len(), 4);
    }
}
