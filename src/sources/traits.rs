//! Value source abstraction
//!
//! This module defines the trait every configuration source implements to
//! take part in resolution.

use crate::domain::{ConfigMap, Result, SourceDiagnostic, SourceKind};
use serde_json::Value;

/// Provider of raw configuration data
///
/// Implementations must return an empty map when nothing is found and reserve
/// errors for genuine I/O or parse failures. The resolver isolates those
/// failures; one broken source never stops the others from contributing.
pub trait ValueSource: Send + Sync {
    /// Stable identity of this source, used in histories and diagnostics
    fn source_name(&self) -> &str;

    /// Whether this source defines whole connections or overlays fields
    fn source_kind(&self) -> SourceKind;

    /// Discover values, optionally restricted to one dotted key
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying data cannot be read or parsed.
    fn discover(&self, key: Option<&str>) -> Result<ConfigMap>;

    /// Original text of a value this source converted before reporting it
    ///
    /// `key` is the dotted path of a discovered leaf. Sources that report
    /// text unchanged return `None`.
    fn raw_text(&self, _key: &str) -> Option<String> {
        None
    }

    /// Drain diagnostics collected since the last call
    fn consume_diagnostics(&self) -> Vec<SourceDiagnostic> {
        Vec::new()
    }
}

/// Restricts a nested map to the entry at `key`
///
/// With no key the map is returned as is. A key that is absent yields an
/// empty map.
pub fn select_key(map: ConfigMap, key: Option<&str>) -> ConfigMap {
    let Some(key) = key else {
        return map;
    };

    let mut segments: Vec<&str> = key.split('.').collect();
    let Some(leaf_name) = segments.pop() else {
        return ConfigMap::new();
    };

    let mut current = &map;
    for segment in &segments {
        match current.get(*segment) {
            Some(Value::Object(nested)) => current = nested,
            _ => return ConfigMap::new(),
        }
    }

    let Some(leaf) = current.get(leaf_name) else {
        return ConfigMap::new();
    };

    let mut selected = ConfigMap::new();
    selected.insert(leaf_name.to_string(), leaf.clone());
    for segment in segments.iter().rev() {
        let mut parent = ConfigMap::new();
        parent.insert((*segment).to_string(), Value::Object(selected));
        selected = parent;
    }
    selected
}
