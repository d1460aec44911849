//! Command-line argument source
//!
//! Flags arrive as `--flag value`, `--flag=value` or a bare `--flag`
//! (meaning `true`). A flag is bare when the next token is another flag or
//! the arguments end. Dashes in flag names become underscores.

use super::traits::{select_key, ValueSource};
use crate::domain::{ConfigMap, Result, SourceKind};
use serde_json::Value;
use std::collections::BTreeMap;

/// Source name of command-line overrides
pub const CLI_ARGUMENTS: &str = "cli_arguments";

/// Overlay source holding values passed on the command line
#[derive(Debug, Clone, Default)]
pub struct CliArgumentsSource {
    values: ConfigMap,
    /// Text of values that were converted after parsing, by key
    raw: BTreeMap<String, String>,
}

impl CliArgumentsSource {
    /// Creates a source from an already-built map; null values are dropped
    pub fn new(values: ConfigMap) -> Self {
        let values = values
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect();
        Self {
            values,
            raw: BTreeMap::new(),
        }
    }

    /// Creates a source from key/value pairs
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Parses raw arguments
    ///
    /// Tokens that are not flags and do not follow a flag are ignored.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        let mut values = ConfigMap::new();
        let mut index = 0;

        while index < tokens.len() {
            let Some(flag) = tokens[index].strip_prefix("--") else {
                index += 1;
                continue;
            };

            if let Some((name, value)) = flag.split_once('=') {
                values.insert(normalize_flag(name), Value::String(value.to_string()));
                index += 1;
            } else if let Some(next) = tokens.get(index + 1).filter(|t| !t.starts_with("--")) {
                values.insert(normalize_flag(flag), Value::String(next.clone()));
                index += 2;
            } else {
                values.insert(normalize_flag(flag), Value::Bool(true));
                index += 1;
            }
        }

        Self {
            values,
            raw: BTreeMap::new(),
        }
    }

    /// Remembers the text a converted value was parsed from
    pub fn with_raw_text(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.raw.insert(key.into(), text.into());
        self
    }

    /// True if no values were given
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn normalize_flag(flag: &str) -> String {
    flag.replace('-', "_")
}

impl ValueSource for CliArgumentsSource {
    fn source_name(&self) -> &str {
        CLI_ARGUMENTS
    }

    fn source_kind(&self) -> SourceKind {
        SourceKind::Overlay
    }

    fn discover(&self, key: Option<&str>) -> Result<ConfigMap> {
        Ok(select_key(self.values.clone(), key))
    }

    fn raw_text(&self, key: &str) -> Option<String> {
        self.raw.get(key).cloned()
    }
}
