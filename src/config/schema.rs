//! Configuration schema types
//!
//! This module defines the structure of `conflux.toml`, the tool's own
//! settings. Connection settings are never stored here; they come from the
//! value sources.

use crate::sources::PermissionPolicy;
use serde::{Deserialize, Serialize};

/// Main Conflux configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where connection settings are read from
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Resolution history settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.sources.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Source locations and toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Legacy snowsql INI files, lowest precedence first
    #[serde(default = "default_legacy_config_paths")]
    pub legacy_config_paths: Vec<String>,

    /// Path of `config.toml`
    #[serde(default = "default_config_toml_path")]
    pub config_toml_path: String,

    /// Path of `connections.toml`
    #[serde(default = "default_connections_toml_path")]
    pub connections_toml_path: String,

    /// Read `SNOWSQL_*` and `SNOWFLAKE_*` environment variables
    #[serde(default = "default_true")]
    pub environment_enabled: bool,

    /// Handling of configuration files readable by group or others
    #[serde(default)]
    pub permission_policy: PermissionPolicy,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            legacy_config_paths: default_legacy_config_paths(),
            config_toml_path: default_config_toml_path(),
            connections_toml_path: default_connections_toml_path(),
            environment_enabled: true,
            permission_policy: PermissionPolicy::default(),
        }
    }
}

impl SourcesConfig {
    fn validate(&self) -> Result<(), String> {
        if self.config_toml_path.trim().is_empty() {
            return Err("sources.config_toml_path cannot be empty".to_string());
        }
        if self.connections_toml_path.trim().is_empty() {
            return Err("sources.connections_toml_path cannot be empty".to_string());
        }
        if let Some(path) = self
            .legacy_config_paths
            .iter()
            .find(|p| p.trim().is_empty())
        {
            return Err(format!(
                "sources.legacy_config_paths contains an empty entry: '{path}'"
            ));
        }
        Ok(())
    }
}

/// Resolution history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Attach a history tracker to the resolver
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Mask secret values in exported histories
    #[serde(default = "default_true")]
    pub redact_exports: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_exports: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when local logging is enabled".to_string());
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_legacy_config_paths() -> Vec<String> {
    vec![
        "/etc/snowsql.cnf".to_string(),
        "/etc/snowflake/snowsql.cnf".to_string(),
        "/usr/local/etc/snowsql.cnf".to_string(),
        "~/.snowsql.cnf".to_string(),
        "~/.snowsql/config".to_string(),
    ]
}

fn default_config_toml_path() -> String {
    "~/.snowflake/config.toml".to_string()
}

fn default_connections_toml_path() -> String {
    "~/.snowflake/connections.toml".to_string()
}

fn default_local_path() -> String {
    "/var/log/conflux".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
