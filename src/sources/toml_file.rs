//! TOML file source
//!
//! Supports the two TOML layouts in use: `config.toml`, where connections
//! live under `[connections.<name>]`, and `connections.toml`, where every
//! top-level table is a connection.

use super::file::{CachedFile, PermissionPolicy};
use super::traits::{select_key, ValueSource};
use crate::domain::{ConfigMap, ConfluxError, Result, SourceDiagnostic, SourceKind, CONNECTIONS_KEY};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Source name of the main TOML configuration file
pub const CLI_CONFIG_TOML: &str = "cli_config_toml";

/// Source name of the dedicated connections file
pub const CONNECTIONS_TOML: &str = "connections_toml";

/// How a TOML file lays out its connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TomlLayout {
    /// Connections nested under a `connections` table
    Nested,
    /// Every top-level table is a connection
    ConnectionsOnly,
}

/// File source backed by a TOML document
#[derive(Debug)]
pub struct TomlFileSource {
    name: String,
    layout: TomlLayout,
    file: CachedFile,
}

impl TomlFileSource {
    /// Creates a TOML source with an explicit name and layout
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, layout: TomlLayout) -> Self {
        let name = name.into();
        Self {
            file: CachedFile::new(name.clone(), path),
            name,
            layout,
        }
    }

    /// Source for `config.toml`
    pub fn cli_config(path: impl Into<PathBuf>) -> Self {
        Self::new(CLI_CONFIG_TOML, path, TomlLayout::Nested)
    }

    /// Source for `connections.toml`
    pub fn connections(path: impl Into<PathBuf>) -> Self {
        Self::new(CONNECTIONS_TOML, path, TomlLayout::ConnectionsOnly)
    }

    /// Sets the permission policy
    pub fn with_permission_policy(mut self, policy: PermissionPolicy) -> Self {
        self.file.set_policy(policy);
        self
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn parse(&self, contents: &str) -> Result<ConfigMap> {
        let table: toml::Table = toml::from_str(contents)?;
        let map = match serde_json::to_value(table)? {
            Value::Object(map) => map,
            _ => {
                return Err(ConfluxError::Configuration(format!(
                    "{} did not parse to a table",
                    self.path().display()
                )))
            }
        };

        Ok(match self.layout {
            TomlLayout::Nested => map,
            TomlLayout::ConnectionsOnly => {
                let mut root = ConfigMap::new();
                let mut connections = ConfigMap::new();
                for (key, value) in map {
                    if value.is_object() {
                        connections.insert(key, value);
                    } else {
                        root.insert(key, value);
                    }
                }
                if !connections.is_empty() {
                    root.insert(CONNECTIONS_KEY.to_string(), Value::Object(connections));
                }
                root
            }
        })
    }
}

impl ValueSource for TomlFileSource {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn discover(&self, key: Option<&str>) -> Result<ConfigMap> {
        let parsed = self.file.load(|contents| self.parse(contents))?;
        Ok(select_key(parsed, key))
    }

    fn consume_diagnostics(&self) -> Vec<SourceDiagnostic> {
        self.file.drain_diagnostics()
    }
}
