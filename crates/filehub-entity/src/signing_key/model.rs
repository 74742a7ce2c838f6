//! Signing key entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use filehub_core::types::SigningKeyId;

/// One symmetric key of the token signing pool.
#[derive(Clone, Serialize, Deserialize, FromRow)]
pub struct SigningKey {
    /// Identifier carried in the token header as `kid`.
    pub id: SigningKeyId,
    /// Base64-encoded random key material.
    #[serde(skip_serializing)]
    pub secret: String,
    /// When the key was generated.
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
