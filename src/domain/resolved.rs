//! Resolved configuration tree
//!
//! The merged result keeps connections apart from root-level settings so that
//! callers and the history tracker never have to split dotted keys by hand.

use super::errors::ConfluxError;
use super::result::Result;
use super::value::ConfigMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Key of the connections branch in nested source output
pub const CONNECTIONS_KEY: &str = "connections";

/// Merged configuration: root-level settings plus named connections
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedConfig {
    /// Root-level keys (everything except connections)
    #[serde(flatten)]
    pub root: ConfigMap,

    /// Connection name to flat parameter map
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub connections: BTreeMap<String, ConfigMap>,
}

impl ResolvedConfig {
    /// Creates an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits a nested source map into root keys and connections
    ///
    /// # Errors
    ///
    /// Returns `MalformedSourceOutput` if the `connections` branch or one of
    /// its entries is not a map.
    pub fn from_nested(mut map: ConfigMap, source_name: &str) -> Result<Self> {
        let connections = match map.remove(CONNECTIONS_KEY) {
            None => BTreeMap::new(),
            Some(Value::Object(entries)) => {
                let mut connections = BTreeMap::new();
                for (name, params) in entries {
                    match params {
                        Value::Object(params) => {
                            connections.insert(name, params);
                        }
                        other => {
                            return Err(ConfluxError::malformed(
                                source_name,
                                format!(
                                    "connection '{name}' must be a table, found {}",
                                    type_name(&other)
                                ),
                            ));
                        }
                    }
                }
                connections
            }
            Some(other) => {
                return Err(ConfluxError::malformed(
                    source_name,
                    format!("'connections' must be a table, found {}", type_name(&other)),
                ));
            }
        };

        Ok(Self {
            root: map,
            connections,
        })
    }

    /// Renders the configuration back into one nested map
    pub fn to_nested(&self) -> ConfigMap {
        let mut map = self.root.clone();
        if !self.connections.is_empty() {
            let connections = self
                .connections
                .iter()
                .map(|(name, params)| (name.clone(), Value::Object(params.clone())))
                .collect();
            map.insert(CONNECTIONS_KEY.to_string(), Value::Object(connections));
        }
        map
    }

    /// Flattens every leaf into a dotted key
    ///
    /// Connection parameters appear as `connections.<name>.<param>`.
    pub fn flatten(&self) -> BTreeMap<String, Value> {
        let mut leaves = BTreeMap::new();
        flatten_into("", &self.root, &mut leaves);
        for (name, params) in &self.connections {
            flatten_into(&connection_key(name, ""), params, &mut leaves);
        }
        leaves
    }

    /// Looks up a dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        if let Some(rest) = path.strip_prefix("connections.") {
            let (name, param_path) = rest.split_once('.')?;
            return lookup(self.connections.get(name)?, param_path);
        }
        lookup(&self.root, path)
    }

    /// Owned value at a dotted path
    ///
    /// Unlike [`get`](Self::get), `connections` and `connections.<name>`
    /// resolve to tables built from the connection maps.
    pub fn value_at(&self, path: &str) -> Option<Value> {
        if path == CONNECTIONS_KEY {
            let nested = self.to_nested();
            return nested.get(CONNECTIONS_KEY).cloned();
        }
        if let Some(name) = path
            .strip_prefix("connections.")
            .filter(|rest| !rest.contains('.'))
        {
            return self
                .connections
                .get(name)
                .map(|params| Value::Object(params.clone()));
        }
        self.get(path).cloned()
    }

    /// Places a value at a dotted path, creating intermediate tables
    ///
    /// A path naming a connection (`connections.<name>`) or the connections
    /// branch itself replaces whole connections and must carry tables.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if a connection path is given a non-table value.
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        if path == CONNECTIONS_KEY {
            let entries = match value {
                Value::Object(entries) => entries,
                other => return Err(not_a_table(path, &other)),
            };
            if let Some((name, params)) = entries.iter().find(|(_, params)| !params.is_object()) {
                return Err(not_a_table(&connection_key(name, ""), params));
            }
            for (name, params) in entries {
                if let Value::Object(params) = params {
                    self.connections.insert(name, params);
                }
            }
            return Ok(());
        }

        if let Some(rest) = path.strip_prefix("connections.") {
            match rest.split_once('.') {
                Some((name, param_path)) => {
                    let params = self.connections.entry(name.to_string()).or_default();
                    insert_path(params, param_path, value);
                }
                None => match value {
                    Value::Object(params) => {
                        self.connections.insert(rest.to_string(), params);
                    }
                    other => return Err(not_a_table(path, &other)),
                },
            }
            return Ok(());
        }

        insert_path(&mut self.root, path, value);
        Ok(())
    }

    /// Returns a connection's parameters
    pub fn connection(&self, name: &str) -> Option<&ConfigMap> {
        self.connections.get(name)
    }

    /// Returns a connection's parameters or fails with `MissingConnection`
    pub fn require_connection(&self, name: &str) -> Result<&ConfigMap> {
        self.connection(name)
            .ok_or_else(|| ConfluxError::MissingConnection(name.to_string()))
    }

    /// Names of all connections, sorted
    pub fn connection_names(&self) -> impl Iterator<Item = &str> {
        self.connections.keys().map(String::as_str)
    }

    /// True if neither root keys nor connections exist
    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.connections.is_empty()
    }
}

/// Builds the dotted key of a connection parameter
pub fn connection_key(connection: &str, param: &str) -> String {
    if param.is_empty() {
        format!("{CONNECTIONS_KEY}.{connection}")
    } else {
        format!("{CONNECTIONS_KEY}.{connection}.{param}")
    }
}

/// Flattens a nested map into dotted leaf keys
///
/// Empty tables are kept as leaves so they remain visible in audits.
pub fn flatten_map(map: &ConfigMap) -> BTreeMap<String, Value> {
    let mut leaves = BTreeMap::new();
    flatten_into("", map, &mut leaves);
    leaves
}

fn flatten_into(prefix: &str, map: &ConfigMap, out: &mut BTreeMap<String, Value>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_into(&path, nested, out),
            _ => {
                out.insert(path, value.clone());
            }
        }
    }
}

fn lookup<'a>(map: &'a ConfigMap, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn insert_path(map: &mut ConfigMap, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(ConfigMap::new()));
            if !entry.is_object() {
                *entry = Value::Object(ConfigMap::new());
            }
            if let Value::Object(nested) = entry {
                insert_path(nested, rest, value);
            }
        }
    }
}

fn not_a_table(path: &str, value: &Value) -> ConfluxError {
    ConfluxError::Validation(format!(
        "'{path}' names a connection and needs a table, found {}",
        type_name(value)
    ))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "table",
    }
}
