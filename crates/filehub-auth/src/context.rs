//! Process-wide assembly of the identity components.

use std::sync::Arc;

use tracing::info;

use filehub_core::config::AppConfig;
use filehub_core::error::AppError;
use filehub_core::traits::Clock;
use filehub_database::store::IdentityStore;

use crate::authenticator::Authenticator;
use crate::jwt::TokenService;
use crate::lockout::{LockoutPolicy, LockoutTracker};
use crate::password::{PasswordHashingRegistry, PasswordValidator};
use crate::permission::PermissionResolver;

/// The identity components, built once at startup.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Register/login facade.
    pub authenticator: Arc<Authenticator>,
    /// Token issuance and verification.
    pub tokens: Arc<TokenService>,
    /// Permission checks for file operations.
    pub permissions: Arc<PermissionResolver>,
}

impl AuthContext {
    /// Validates configuration, loads or creates the signing key pool, and
    /// wires the components together.
    ///
    /// Must complete before any request is served.
    pub async fn initialize(
        config: &AppConfig,
        store: Arc<dyn IdentityStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let policy = LockoutPolicy::from_config(&config.auth.lockout)?;
        let permissions = Arc::new(PermissionResolver::from_config(&config.permissions)?);

        let tokens = Arc::new(
            TokenService::initialize(&config.auth, Arc::clone(&store), Arc::clone(&clock)).await?,
        );

        let authenticator = Arc::new(Authenticator::new(
            Arc::clone(&store),
            PasswordHashingRegistry::new(),
            PasswordValidator::new(&config.auth),
            LockoutTracker::new(store, clock, policy),
            Arc::clone(&tokens),
        ));

        info!(
            threshold = policy.threshold(),
            directories = permissions.snapshot().len(),
            "Identity subsystem initialized"
        );

        Ok(Self {
            authenticator,
            tokens,
            permissions,
        })
    }
}
