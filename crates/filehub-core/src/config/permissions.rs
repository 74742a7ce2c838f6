//! Directory permission table configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Permission notation per top-level directory.
///
/// Each value is either the 12-character letter form (`"crud-r---r--"`)
/// or the 3-digit hex form (`"f44"`), one group/digit per tier in the
/// order owner, user, public.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// Notation applied to directories without their own entry.
    #[serde(default = "default_permissions")]
    pub default: String,
    /// Notation keyed by the first path segment.
    #[serde(default)]
    pub directories: HashMap<String, String>,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            default: default_permissions(),
            directories: HashMap::new(),
        }
    }
}

fn default_permissions() -> String {
    "crud--------".to_string()
}
