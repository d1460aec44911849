//! Environment variable sources
//!
//! Three naming schemes over two prefixes:
//!
//! | Scheme | Example | Result |
//! |---|---|---|
//! | [`EnvironmentScheme::Snowsql`] | `SNOWSQL_PWD` | general `password` |
//! | [`EnvironmentScheme::ConnectionScoped`] | `SNOWFLAKE_CONNECTIONS_PROD_ROLE` | `connections.prod.role` |
//! | [`EnvironmentScheme::Cli`] | `SNOWFLAKE_ACCOUNT` | general `account` |

use super::legacy_ini::map_legacy_key;
use super::traits::{select_key, ValueSource};
use crate::domain::parameters::{is_connection_parameter, CONNECTION_PARAMETERS};
use crate::domain::{ConfigMap, Result, SourceKind, CONNECTIONS_KEY};
use serde_json::Value;

const SNOWSQL_PREFIX: &str = "SNOWSQL_";
const SNOWFLAKE_PREFIX: &str = "SNOWFLAKE_";
const CONNECTIONS_PREFIX: &str = "SNOWFLAKE_CONNECTIONS_";
const DEFAULT_CONNECTION_VAR: &str = "SNOWFLAKE_DEFAULT_CONNECTION_NAME";

/// Environment variable naming scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentScheme {
    /// Legacy `SNOWSQL_<PARAM>` variables
    Snowsql,
    /// `SNOWFLAKE_CONNECTIONS_<NAME>_<PARAM>` variables
    ConnectionScoped,
    /// `SNOWFLAKE_<PARAM>` variables
    Cli,
}

impl EnvironmentScheme {
    /// Source name used for this scheme
    pub fn source_name(&self) -> &'static str {
        match self {
            EnvironmentScheme::Snowsql => "snowsql_env",
            EnvironmentScheme::ConnectionScoped => "connection_specific_env",
            EnvironmentScheme::Cli => "cli_env",
        }
    }

    /// Maps one variable into the source map, if the scheme claims it
    fn apply(&self, name: &str, value: &str, map: &mut ConfigMap) {
        let value = Value::String(value.to_string());
        match self {
            EnvironmentScheme::Snowsql => {
                if let Some(param) = name.strip_prefix(SNOWSQL_PREFIX) {
                    let param = map_legacy_key(param);
                    if is_connection_parameter(&param) {
                        map.insert(param, value);
                    }
                }
            }
            EnvironmentScheme::ConnectionScoped => {
                if let Some(rest) = name.strip_prefix(CONNECTIONS_PREFIX) {
                    if let Some((connection, param)) = split_connection_variable(rest) {
                        let connections = map
                            .entry(CONNECTIONS_KEY.to_string())
                            .or_insert_with(|| Value::Object(ConfigMap::new()));
                        if let Value::Object(connections) = connections {
                            let params = connections
                                .entry(connection)
                                .or_insert_with(|| Value::Object(ConfigMap::new()));
                            if let Value::Object(params) = params {
                                params.insert(param, value);
                            }
                        }
                    }
                }
            }
            EnvironmentScheme::Cli => {
                if name == DEFAULT_CONNECTION_VAR {
                    map.insert("default_connection_name".to_string(), value);
                } else if name.starts_with(CONNECTIONS_PREFIX) {
                    // Claimed by the connection scoped scheme
                } else if let Some(param) = name.strip_prefix(SNOWFLAKE_PREFIX) {
                    let param = param.to_ascii_lowercase();
                    if is_connection_parameter(&param) {
                        map.insert(param, value);
                    }
                }
            }
        }
    }
}

/// Splits `<NAME>_<PARAM>` using the longest known parameter suffix
fn split_connection_variable(rest: &str) -> Option<(String, String)> {
    let lower = rest.to_ascii_lowercase();
    CONNECTION_PARAMETERS
        .iter()
        .filter_map(|param| {
            let name = lower.strip_suffix(param)?.strip_suffix('_')?;
            (!name.is_empty()).then(|| (name.to_string(), (*param).to_string()))
        })
        .max_by_key(|(_, param)| param.len())
}

/// Overlay source reading environment variables
#[derive(Debug, Clone)]
pub struct EnvironmentSource {
    scheme: EnvironmentScheme,
    vars: Option<Vec<(String, String)>>,
}

impl EnvironmentSource {
    /// Reads the process environment at each discovery
    pub fn new(scheme: EnvironmentScheme) -> Self {
        Self { scheme, vars: None }
    }

    /// Uses a fixed set of variables instead of the process environment
    pub fn with_vars<I, K, V>(scheme: EnvironmentScheme, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            scheme,
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Naming scheme of this source
    pub fn scheme(&self) -> EnvironmentScheme {
        self.scheme
    }

    fn snapshot(&self) -> Vec<(String, String)> {
        let mut vars = match &self.vars {
            Some(vars) => vars.clone(),
            None => std::env::vars().collect(),
        };
        vars.sort();
        vars
    }
}

impl ValueSource for EnvironmentSource {
    fn source_name(&self) -> &str {
        self.scheme.source_name()
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Overlay
    }

    fn discover(&self, key: Option<&str>) -> Result<ConfigMap> {
        let mut map = ConfigMap::new();
        for (name, value) in self.snapshot() {
            self.scheme.apply(&name, &value, &mut map);
        }
        Ok(select_key(map, key))
    }
}
