//! Map merge primitives used by the resolution phases

use crate::domain::parameters::{
    is_connection_parameter, is_synthesis_eligible, DEFAULT_CONNECTION_NAME,
};
use crate::domain::{ConfigMap, ResolvedConfig};
use serde_json::Value;

/// Merges `source` into `target`
///
/// Maps merge key by key; scalars and lists replace.
pub fn deep_merge(target: &mut ConfigMap, source: &ConfigMap) {
    for (key, value) in source {
        if let (Some(Value::Object(existing)), Value::Object(incoming)) =
            (target.get_mut(key), value)
        {
            deep_merge(existing, incoming);
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

/// Fills keys of `target` that are missing from `defaults`
///
/// Returns the keys that were inserted, in `defaults` order.
pub fn merge_defaults(target: &mut ConfigMap, defaults: &ConfigMap) -> Vec<String> {
    let mut inserted = Vec::new();
    for (key, value) in defaults {
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
            inserted.push(key.clone());
        }
    }
    inserted
}

/// Splits root-level data into general connection parameters and the rest
///
/// A general parameter is a scalar root key naming a connection parameter.
pub fn split_general(root: ConfigMap) -> (ConfigMap, ConfigMap) {
    let mut general = ConfigMap::new();
    let mut other = ConfigMap::new();
    for (key, value) in root {
        if is_connection_parameter(&key) && !value.is_object() {
            general.insert(key, value);
        } else {
            other.insert(key, value);
        }
    }
    (general, other)
}

/// Moves eligible root parameters into a synthesized `default` connection
///
/// Does nothing when connections already exist. Returns the moved keys.
pub fn synthesize_default_connection(config: &mut ResolvedConfig) -> Vec<String> {
    if !config.connections.is_empty() {
        return Vec::new();
    }

    let keys: Vec<String> = config
        .root
        .iter()
        .filter(|(key, value)| is_synthesis_eligible(key) && !value.is_object())
        .map(|(key, _)| key.clone())
        .collect();
    if keys.is_empty() {
        return keys;
    }

    let mut params = ConfigMap::new();
    for key in &keys {
        if let Some(value) = config.root.remove(key) {
            params.insert(key.clone(), value);
        }
    }
    config
        .connections
        .insert(DEFAULT_CONNECTION_NAME.to_string(), params);
    keys
}
