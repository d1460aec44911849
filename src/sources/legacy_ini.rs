//! Legacy INI configuration source
//!
//! Reads snowsql-style configuration files:
//!
//! ```ini
//! [connections]
//! accountname = acct1
//! username = legacy
//!
//! [connections.reporting]
//! accountname = acct2
//! rolename = analyst
//!
//! [variables]
//! env = dev
//! ```
//!
//! The bare `[connections]` section becomes the `default` connection and the
//! legacy key names are mapped onto the current parameter names.

use super::file::{CachedFile, PermissionPolicy};
use super::traits::{select_key, ValueSource};
use crate::domain::parameters::DEFAULT_CONNECTION_NAME;
use crate::domain::{ConfigMap, Result, SourceDiagnostic, SourceKind, CONNECTIONS_KEY};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Source name of the legacy configuration files
pub const SNOWSQL_CONFIG: &str = "snowsql_config";

const LEGACY_KEY_NAMES: &[(&str, &str)] = &[
    ("accountname", "account"),
    ("username", "user"),
    ("pwd", "password"),
    ("dbname", "database"),
    ("schemaname", "schema"),
    ("rolename", "role"),
    ("warehousename", "warehouse"),
    ("private_key_path", "private_key_file"),
];

/// Maps a legacy parameter name onto its current name
pub fn map_legacy_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    LEGACY_KEY_NAMES
        .iter()
        .find(|(legacy, _)| *legacy == key)
        .map(|(_, current)| (*current).to_string())
        .unwrap_or(key)
}

/// File source backed by a snowsql INI file
#[derive(Debug)]
pub struct LegacyIniSource {
    name: String,
    file: CachedFile,
}

impl LegacyIniSource {
    /// Creates a legacy INI source for one file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::named(SNOWSQL_CONFIG, path)
    }

    /// Creates a legacy INI source with an explicit name
    pub fn named(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        Self {
            file: CachedFile::new(name.clone(), path),
            name,
        }
    }

    /// Sets the permission policy
    pub fn with_permission_policy(mut self, policy: PermissionPolicy) -> Self {
        self.file.set_policy(policy);
        self
    }

    fn parse(&self, contents: &str) -> Result<ConfigMap> {
        let parsed = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Ini))
            .build()?;
        let sections: BTreeMap<String, Value> = parsed.try_deserialize()?;

        let mut connections: BTreeMap<String, ConfigMap> = BTreeMap::new();
        let mut root = ConfigMap::new();

        for (section, value) in sections {
            let section = section.to_ascii_lowercase();
            match (section.as_str(), value) {
                (CONNECTIONS_KEY, Value::Object(entries)) => {
                    // Dotted section names may arrive already nested under `connections`
                    for (key, value) in entries {
                        match value {
                            Value::Object(params) => {
                                merge_params(connections.entry(key).or_default(), params);
                            }
                            scalar => {
                                connections
                                    .entry(DEFAULT_CONNECTION_NAME.to_string())
                                    .or_default()
                                    .insert(map_legacy_key(&key), scalar);
                            }
                        }
                    }
                }
                ("variables", Value::Object(variables)) => {
                    root.insert("variables".to_string(), Value::Object(variables));
                }
                (other, Value::Object(params)) => match other.strip_prefix("connections.") {
                    Some(name) => merge_params(connections.entry(name.to_string()).or_default(), params),
                    None => {
                        tracing::debug!(source = %self.name, section = other, "Ignoring legacy section");
                    }
                },
                (other, _) => {
                    tracing::debug!(source = %self.name, key = other, "Ignoring legacy top-level key");
                }
            }
        }

        if !connections.is_empty() {
            let connections = connections
                .into_iter()
                .map(|(name, params)| (name, Value::Object(params)))
                .collect();
            root.insert(CONNECTIONS_KEY.to_string(), Value::Object(connections));
        }
        Ok(root)
    }
}

fn merge_params(target: &mut ConfigMap, params: ConfigMap) {
    for (key, value) in params {
        target.insert(map_legacy_key(&key), value);
    }
}

impl ValueSource for LegacyIniSource {
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
