//! Effective rights resolution.
//!
//! Resolution order:
//! 1. Admin bypass: every right, before any table lookup.
//! 2. Matrix lookup by the first path segment, else the default.
//! 3. Tier selection: owner, user, or public.
//! 4. The tier's rights from the matrix.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use filehub_core::config::PermissionsConfig;
use filehub_core::error::AppError;
use filehub_entity::permission::{RightSet, Tier};
use filehub_entity::user::home_directory;

use super::actor::{Actor, Resource};
use super::operation::{Operation, Transfer, first_segment};
use super::table::PermissionTable;

/// Turns (actor, path, resource, operation) into a rights set.
///
/// Holds no state between calls beyond the table snapshot, which
/// [`PermissionResolver::reload`] swaps atomically.
pub struct PermissionResolver {
    table: watch::Sender<Arc<PermissionTable>>,
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver")
            .field("table", &self.snapshot())
            .finish()
    }
}

impl PermissionResolver {
    /// Creates a resolver over `table`.
    pub fn new(table: PermissionTable) -> Self {
        let (table, _) = watch::channel(Arc::new(table));
        Self { table }
    }

    /// Parses the configured table.
    pub fn from_config(config: &PermissionsConfig) -> Result<Self, AppError> {
        Ok(Self::new(PermissionTable::from_config(config)?))
    }

    /// Replaces the table. Calls in flight keep the snapshot they took.
    pub fn reload(&self, table: PermissionTable) {
        info!(directories = table.len(), "Permission table reloaded");
        self.table.send_replace(Arc::new(table));
    }

    /// The current table.
    pub fn snapshot(&self) -> Arc<PermissionTable> {
        self.table.borrow().clone()
    }

    /// Rights `actor` holds on `path` for `operation`.
    pub fn resolve(
        &self,
        actor: &Actor,
        path: &str,
        resource: &Resource,
        operation: Operation,
    ) -> RightSet {
        if actor.is_admin() {
            return RightSet::ALL;
        }

        let segment = first_segment(path);
        let table = self.snapshot();
        let matrix = table.lookup(segment);

        matrix.rights(Self::tier(actor, segment, resource, operation))
    }

    fn tier(actor: &Actor, segment: &str, resource: &Resource, operation: Operation) -> Tier {
        let Some(principal) = actor.principal() else {
            return Tier::Public;
        };

        let owns_resource = resource.owner() == Some(principal.owner_id);
        let in_home = operation.is_directory_level(resource.exists())
            && segment == home_directory(&principal.owner_id);

        if owns_resource || in_home {
            Tier::Owner
        } else {
            Tier::User
        }
    }

    /// Fails with [`AppError::forbidden`] naming the first missing right.
    pub fn authorize(
        &self,
        actor: &Actor,
        path: &str,
        resource: &Resource,
        operation: Operation,
    ) -> Result<(), AppError> {
        let granted = self.resolve(actor, path, resource, operation);
        let required = operation.required_rights(resource.exists());

        match granted.first_missing(required) {
            None => Ok(()),
            Some(missing) => {
                debug!(
                    path = %path,
                    operation = %operation,
                    missing = %missing,
                    granted = %granted,
                    "Permission denied"
                );
                Err(AppError::forbidden(missing, path))
            }
        }
    }

    /// Checks both sides of a copy or move; the source is checked first and
    /// either failure denies the whole operation.
    pub fn authorize_transfer(
        &self,
        actor: &Actor,
        transfer: Transfer,
        source: (&str, &Resource),
        target: (&str, &Resource),
    ) -> Result<(), AppError> {
        let (source_op, target_op) = transfer.sides();
        self.authorize(actor, source.0, source.1, source_op)?;
        self.authorize(actor, target.0, target.1, target_op)
    }
}

impl Default for PermissionResolver {
    fn default() -> Self {
        Self::new(PermissionTable::default())
    }
}
