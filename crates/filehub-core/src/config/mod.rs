//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod auth;
pub mod database;
pub mod logging;
pub mod permissions;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::auth::{AuthConfig, LockoutConfig};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::permissions::PermissionsConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Authentication, token, and lockout settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Directory permission table.
    #[serde(default)]
    pub permissions: PermissionsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `FILEHUB_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        debug!(env = %env, "Loading configuration");

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FILEHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = AppConfig::from_toml(
            r#"
            [database]
            url = "postgres://filehub@localhost/filehub"
            "#,
        )
        .expect("minimal config should parse");

        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.auth.signing_key_count, 8);
        assert_eq!(config.auth.lockout.threshold, 5);
        assert_eq!(config.permissions.default, "crud--------");
        assert!(config.permissions.directories.is_empty());
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_directory_permissions_parse() {
        let config = AppConfig::from_toml(
            r#"
            [database]
            url = "postgres://localhost/filehub"

            [permissions]
            default = "f00"

            [permissions.directories]
            public = "crud-r---r--"
            drop = "e40"

            [auth.lockout]
            threshold = 3
            ttl_min_seconds = 2
            ttl_max_seconds = 60
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.permissions.default, "f00");
        assert_eq!(
            config.permissions.directories.get("drop").map(String::as_str),
            Some("e40")
        );
        assert_eq!(config.auth.lockout.threshold, 3);
        assert_eq!(config.auth.lockout.ttl_max_seconds, 60);
    }

    #[test]
    fn test_missing_database_is_an_error() {
        assert!(AppConfig::from_toml("[logging]\nlevel = \"debug\"\n").is_err());
    }
}
