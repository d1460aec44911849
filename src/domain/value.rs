//! Discovered configuration values and source diagnostics

use super::parameters::is_sensitive_key;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Nested map returned by value sources
pub type ConfigMap = serde_json::Map<String, Value>;

/// How a source's data is merged into the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Defines whole connection records; later files replace earlier ones
    File,
    /// Supplies sparse fields merged on top of the file-derived base
    Overlay,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::File => write!(f, "file"),
            SourceKind::Overlay => write!(f, "overlay"),
        }
    }
}

/// A single value as a source reported it
#[derive(Clone, PartialEq, Serialize)]
pub struct ConfigValue {
    /// Dotted key the value was found under
    pub key: String,

    /// Value as merged
    pub value: Value,

    /// Textual form before any conversion
    pub raw_value: Option<String>,

    /// Name of the source that supplied the value
    pub source_name: String,

    /// Kind of the source that supplied the value
    pub source_kind: SourceKind,
}

impl ConfigValue {
    /// Creates a config value, deriving `raw_value` from the value itself
    pub fn new(
        key: impl Into<String>,
        value: Value,
        source_name: impl Into<String>,
        source_kind: SourceKind,
    ) -> Self {
        let raw_value = match &value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };
        Self {
            key: key.into(),
            value,
            raw_value,
            source_name: source_name.into(),
            source_kind,
        }
    }

    /// Replaces the derived `raw_value` with the text a source converted
    pub fn with_raw_value(mut self, raw_value: Option<String>) -> Self {
        if raw_value.is_some() {
            self.raw_value = raw_value;
        }
        self
    }

    /// Returns a copy of this value filed under another key
    pub fn rekeyed(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..self.clone()
        }
    }

    /// True if the key names a secret
    pub fn is_sensitive(&self) -> bool {
        is_sensitive_key(&self.key)
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ConfigValue");
        s.field("key", &self.key);
        if self.is_sensitive() {
            s.field("value", &"[REDACTED]");
            s.field("raw_value", &"[REDACTED]");
        } else {
            s.field("value", &self.value);
            s.field("raw_value", &self.raw_value);
        }
        s.field("source_name", &self.source_name)
            .field("source_kind", &self.source_kind)
            .finish()
    }
}

/// Severity of a source diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Informational
    Info,
    /// Something was off but the source still contributed
    Warning,
    /// The source did not contribute
    Error,
}

/// A source's self-report, drained once per read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDiagnostic {
    /// Reporting source
    pub source_name: String,
    /// Severity
    pub level: DiagnosticLevel,
    /// Human-readable message
    pub message: String,
}

impl SourceDiagnostic {
    /// Creates a diagnostic
    pub fn new(
        source_name: impl Into<String>,
        level: DiagnosticLevel,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            level,
            message: message.into(),
        }
    }

    /// Creates a warning diagnostic
    pub fn warning(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(source_name, DiagnosticLevel::Warning, message)
    }

    /// Creates an error diagnostic
    pub fn error(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(source_name, DiagnosticLevel::Error, message)
    }
}
