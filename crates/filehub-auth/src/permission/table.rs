//! Directory permission table.

use std::collections::HashMap;

use filehub_core::config::PermissionsConfig;
use filehub_core::error::AppError;
use filehub_entity::permission::RightSet;

use super::notation::PermissionMatrix;

/// Matrices keyed by first path segment, with a fallback default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTable {
    default: PermissionMatrix,
    directories: HashMap<String, PermissionMatrix>,
}

impl PermissionTable {
    /// A table with only a default entry.
    pub fn new(default: PermissionMatrix) -> Self {
        Self {
            default,
            directories: HashMap::new(),
        }
    }

    /// Adds or replaces a directory entry.
    pub fn with_directory(
        mut self,
        directory: impl Into<String>,
        matrix: PermissionMatrix,
    ) -> Self {
        self.directories.insert(directory.into(), matrix);
        self
    }

    /// Parses every entry of the configuration. Any malformed notation fails
    /// the whole table.
    pub fn from_config(config: &PermissionsConfig) -> Result<Self, AppError> {
        let default = PermissionMatrix::parse(&config.default).map_err(|e| {
            AppError::configuration(format!("permissions.default: {}", e.message))
        })?;

        let directories = config
            .directories
            .iter()
            .map(|(directory, notation)| {
                PermissionMatrix::parse(notation)
                    .map(|matrix| (directory.clone(), matrix))
                    .map_err(|e| {
                        AppError::configuration(format!(
                            "permissions.directories.{directory}: {}",
                            e.message
                        ))
                    })
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            default,
            directories,
        })
    }

    /// Matrix for a first path segment, falling back to the default.
    pub fn lookup(&self, segment: &str) -> &PermissionMatrix {
        self.directories.get(segment).unwrap_or(&self.default)
    }

    /// The fallback matrix.
    pub fn default_matrix(&self) -> &PermissionMatrix {
        &self.default
    }

    /// Number of directory-specific entries.
    pub fn len(&self) -> usize {
        self.directories.len()
    }

    /// Whether only the default entry exists.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::new(PermissionMatrix::new(
            RightSet::ALL,
            RightSet::NONE,
            RightSet::NONE,
        ))
    }
}
