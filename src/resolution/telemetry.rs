//! Resolution telemetry
//!
//! Counts what happened during a pass. Per-pass counters are zeroed on
//! reset; `passes` accumulates over the observer's lifetime.

use super::observer::ResolutionObserver;
use crate::domain::{ConfigMap, ConfigValue, SourceKind};
use serde::Serialize;
use serde_json::Value;

/// Counter values at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    pub passes: u64,
    pub sources_consulted: u64,
    pub sources_failed: u64,
    pub values_discovered: u64,
    pub general_broadcasts: u64,
    pub connections_synthesized: u64,
    pub defaults_used: u64,
}

/// Observer aggregating resolution counters
#[derive(Debug, Clone, Default)]
pub struct TelemetryObserver {
    counters: TelemetrySnapshot,
}

impl TelemetryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.counters
    }
}

impl ResolutionObserver for TelemetryObserver {
    fn on_reset(&mut self) {
        self.counters = TelemetrySnapshot {
            passes: self.counters.passes + 1,
            ..TelemetrySnapshot::default()
        };
    }

    fn on_nested_discovery(&mut self, _data: &ConfigMap, _source_name: &str, _kind: SourceKind) {
        self.counters.sources_consulted += 1;
    }

    fn on_discovery(&mut self, _key: &str, _value: &ConfigValue) {
        self.counters.values_discovered += 1;
    }

    fn on_source_failed(&mut self, _source_name: &str, _message: &str) {
        self.counters.sources_consulted += 1;
        self.counters.sources_failed += 1;
    }

    fn on_general_broadcast(&mut self, _connection: &str, _value: &ConfigValue) {
        self.counters.general_broadcasts += 1;
    }

    fn on_connection_synthesized(&mut self, _connection: &str, _keys: &[String]) {
        self.counters.connections_synthesized += 1;
    }

    fn on_default_used(&mut self, _key: &str, _value: &Value) {
        self.counters.defaults_used += 1;
    }
}
