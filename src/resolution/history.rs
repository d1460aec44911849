//! Resolution history tracking
//!
//! The tracker records every candidate value considered for a key, in
//! consultation order, and after the pass marks which one ended up in the
//! merged result.

use super::observer::ResolutionObserver;
use crate::domain::{
    connection_key, flatten_map, ConfigMap, ConfigValue, ResolvedConfig, SourceKind,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Source name of synthetic entries created for caller defaults
pub const DEFAULT_SOURCE_NAME: &str = "default";

/// One candidate value for a key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionEntry {
    /// The value as its source reported it
    pub config_value: ConfigValue,
    /// When the value was recorded
    pub timestamp: DateTime<Utc>,
    /// True for the entry that supplied the final value
    pub was_used: bool,
    /// Source whose value won instead of this one
    pub overridden_by: Option<String>,
}

impl ResolutionEntry {
    fn new(config_value: ConfigValue) -> Self {
        Self {
            config_value,
            timestamp: Utc::now(),
            was_used: false,
            overridden_by: None,
        }
    }

    /// Name of the source that supplied this entry
    pub fn source_name(&self) -> &str {
        &self.config_value.source_name
    }

    /// Candidate value
    pub fn value(&self) -> &Value {
        &self.config_value.value
    }
}

/// All candidates considered for one key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionHistory {
    /// Dotted key
    pub key: String,
    /// Candidates in consultation order
    pub entries: Vec<ResolutionEntry>,
    /// Value in the merged result, if the key survived
    pub final_value: Option<Value>,
    /// True if a caller default filled the key
    pub default_used: bool,
}

impl ResolutionHistory {
    fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: Vec::new(),
            final_value: None,
            default_used: false,
        }
    }

    /// Sources in consultation order
    pub fn sources_consulted(&self) -> Vec<&str> {
        self.entries.iter().map(ResolutionEntry::source_name).collect()
    }

    /// Candidate values in consultation order
    pub fn values_considered(&self) -> Vec<&Value> {
        self.entries.iter().map(ResolutionEntry::value).collect()
    }

    /// The entry that supplied the final value
    pub fn selected_entry(&self) -> Option<&ResolutionEntry> {
        self.entries.iter().find(|e| e.was_used)
    }

    /// Entries that lost to the selected one
    pub fn overridden_entries(&self) -> Vec<&ResolutionEntry> {
        self.entries.iter().filter(|e| !e.was_used).collect()
    }

    fn has_source(&self, source_name: &str) -> bool {
        self.entries.iter().any(|e| e.source_name() == source_name)
    }
}

/// Aggregate view over all histories of a pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionSummary {
    /// Keys that ended up with a final value
    pub total_keys_resolved: usize,
    /// Keys with more than one candidate
    pub keys_with_overrides: usize,
    /// Keys filled from a caller default
    pub keys_using_defaults: usize,
    /// Number of winning entries per source
    pub source_wins: BTreeMap<String, usize>,
}

/// Observer keeping the full per-key audit trail
#[derive(Debug, Clone, Default)]
pub struct ResolutionHistoryTracker {
    histories: BTreeMap<String, ResolutionHistory>,
}

impl ResolutionHistoryTracker {
    /// Creates an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a candidate for `key`
    ///
    /// A second value for the same key from the same source in one pass is
    /// ignored.
    pub fn record_discovery(&mut self, key: &str, config_value: ConfigValue) {
        let history = self
            .histories
            .entry(key.to_string())
            .or_insert_with(|| ResolutionHistory::new(key));
        if history.has_source(&config_value.source_name) {
            return;
        }
        history.entries.push(ResolutionEntry::new(config_value));
    }

    /// Flattens a nested map and records each leaf
    pub fn record_nested_discovery(
        &mut self,
        data: &ConfigMap,
        source_name: &str,
        source_kind: SourceKind,
    ) {
        for (key, value) in flatten_map(data) {
            let config_value = ConfigValue::new(key.as_str(), value, source_name, source_kind);
            self.record_discovery(&key, config_value);
        }
    }

    /// Notes that a caller default filled `key`
    pub fn mark_default_used(&mut self, key: &str, value: &Value) {
        let history = self
            .histories
            .entry(key.to_string())
            .or_insert_with(|| ResolutionHistory::new(key));
        if history.entries.is_empty() {
            history.entries.push(ResolutionEntry::new(ConfigValue::new(
                key,
                value.clone(),
                DEFAULT_SOURCE_NAME,
                SourceKind::Overlay,
            )));
        }
        history.default_used = true;
    }

    /// Marks the entry from `source_name` as used and the rest as overridden
    ///
    /// Returns false if the key or the source is unknown.
    pub fn mark_selected(&mut self, key: &str, source_name: &str) -> bool {
        let Some(history) = self.histories.get_mut(key) else {
            return false;
        };
        if !history.has_source(source_name) {
            return false;
        }

        for entry in history.entries.iter_mut() {
            if entry.source_name() == source_name {
                entry.was_used = true;
                entry.overridden_by = None;
                history.final_value = Some(entry.config_value.value.clone());
            } else {
                entry.was_used = false;
                entry.overridden_by = Some(source_name.to_string());
            }
        }
        true
    }

    /// Copies the histories of root-level keys under a synthesized connection
    pub fn replicate_root_level_discoveries_to_connection(
        &mut self,
        keys: &[String],
        connection: &str,
    ) {
        for key in keys {
            let Some(history) = self.histories.get(key) else {
                continue;
            };
            let target = connection_key(connection, key);
            let values: Vec<ConfigValue> = history
                .entries
                .iter()
                .map(|e| e.config_value.rekeyed(target.as_str()))
                .collect();
            for value in values {
                self.record_discovery(&target, value);
            }
        }
    }

    /// Marks, per leaf of the final result, the latest matching entry
    pub fn finalize(&mut self, resolved: &ResolvedConfig) {
        for (key, value) in resolved.flatten() {
            let Some(history) = self.histories.get_mut(&key) else {
                continue;
            };
            let winner = history
                .entries
                .iter()
                .rev()
                .find(|e| e.config_value.value == value)
                .map(|e| e.source_name().to_string());
            match winner {
                Some(source_name) => {
                    self.mark_selected(&key, &source_name);
                }
                None => history.final_value = Some(value),
            }
        }
    }

    /// Clears all per-pass state
    pub fn reset(&mut self) {
        self.histories.clear();
    }

    /// Looks up a history
    ///
    /// Falls back from a bare key such as `account` to a tracked key ending
    /// in `.account`, preferring one with a selected entry.
    pub fn get(&self, key: &str) -> Option<&ResolutionHistory> {
        if let Some(history) = self.histories.get(key) {
            return Some(history);
        }
        if key.contains('.') {
            return None;
        }

        let suffix = format!(".{key}");
        let mut candidates = self
            .histories
            .iter()
            .filter(|(tracked, _)| tracked.ends_with(&suffix))
            .map(|(_, history)| history);
        let first = candidates.next()?;
        if first.selected_entry().is_some() {
            return Some(first);
        }
        candidates
            .find(|h| h.selected_entry().is_some())
            .or(Some(first))
    }

    /// All histories, keyed and sorted by key
    pub fn histories(&self) -> &BTreeMap<String, ResolutionHistory> {
        &self.histories
    }

    /// Summarizes the current pass
    pub fn get_summary(&self) -> ResolutionSummary {
        let mut summary = ResolutionSummary::default();
        for history in self.histories.values() {
            if history.final_value.is_some() {
                summary.total_keys_resolved += 1;
            }
            if history.entries.len() > 1 {
                summary.keys_with_overrides += 1;
            }
            if history.default_used {
                summary.keys_using_defaults += 1;
            }
            if let Some(selected) = history.selected_entry() {
                *summary
                    .source_wins
                    .entry(selected.source_name().to_string())
                    .or_default() += 1;
            }
        }
        summary
    }
}

impl ResolutionObserver for ResolutionHistoryTracker {
    fn on_reset(&mut self) {
        self.reset();
    }

    fn on_discovery(&mut self, key: &str, value: &ConfigValue) {
        self.record_discovery(key, value.clone());
    }

    fn on_general_broadcast(&mut self, _connection: &str, value: &ConfigValue) {
        self.record_discovery(&value.key, value.clone());
    }

    fn on_connection_synthesized(&mut self, connection: &str, keys: &[String]) {
        self.replicate_root_level_discoveries_to_connection(keys, connection);
    }

    fn on_default_used(&mut self, key: &str, value: &Value) {
        self.mark_default_used(key, value);
    }

    fn on_finalize(&mut self, resolved: &ResolvedConfig) {
        self.finalize(resolved);
    }
}
