//! Resolution observers
//!
//! Observers receive every discovery and merge event of a resolution pass.
//! Each event kind has its own method with a no-op default, so an observer
//! only implements what it cares about.

use super::history::ResolutionHistoryTracker;
use super::telemetry::TelemetryObserver;
use crate::domain::{ConfigMap, ConfigValue, ResolvedConfig, SourceKind};
use serde_json::Value;

/// Sink for resolution events
#[allow(unused_variables)]
pub trait ResolutionObserver {
    /// A new pass is starting; per-pass state must be cleared
    fn on_reset(&mut self) {}

    /// A source returned data
    fn on_nested_discovery(&mut self, data: &ConfigMap, source_name: &str, source_kind: SourceKind) {
    }

    /// One leaf of a source's data, sent after `on_nested_discovery`
    ///
    /// `value.raw_value` carries the source's original text when it
    /// converted the value.
    fn on_discovery(&mut self, key: &str, value: &ConfigValue) {}

    /// A source failed; `message` is already sanitized
    fn on_source_failed(&mut self, source_name: &str, message: &str) {}

    /// A general parameter was applied to a connection as a default
    ///
    /// `value.key` is the connection-qualified key.
    fn on_general_broadcast(&mut self, connection: &str, value: &ConfigValue) {}

    /// A connection was synthesized from root-level parameters
    fn on_connection_synthesized(&mut self, connection: &str, keys: &[String]) {}

    /// A caller-supplied default filled a missing key
    fn on_default_used(&mut self, key: &str, value: &Value) {}

    /// The pass finished with this result
    fn on_finalize(&mut self, resolved: &ResolvedConfig) {}
}

/// An observer handed to the resolver
///
/// Built-in kinds get typed slots so their state stays queryable.
pub enum Observer {
    /// Per-key audit trail
    History(ResolutionHistoryTracker),
    /// Aggregate counters
    Telemetry(TelemetryObserver),
    /// Any other observer
    Custom(Box<dyn ResolutionObserver>),
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Observer::History(_) => write!(f, "Observer::History"),
            Observer::Telemetry(_) => write!(f, "Observer::Telemetry"),
            Observer::Custom(_) => write!(f, "Observer::Custom"),
        }
    }
}

/// The observers attached to one resolver
#[derive(Default)]
pub(crate) struct ObserverSet {
    pub(crate) history: Option<ResolutionHistoryTracker>,
    pub(crate) telemetry: Option<TelemetryObserver>,
    pub(crate) custom: Vec<Box<dyn ResolutionObserver>>,
}

impl ObserverSet {
    /// Places an observer in its slot, replacing a built-in of the same kind
    pub(crate) fn attach(&mut self, observer: Observer) {
        match observer {
            Observer::History(tracker) => self.history = Some(tracker),
            Observer::Telemetry(telemetry) => self.telemetry = Some(telemetry),
            Observer::Custom(observer) => self.custom.push(observer),
        }
    }

    /// Delivers one event to every observer
    pub(crate) fn notify<F>(&mut self, mut event: F)
    where
        F: FnMut(&mut dyn ResolutionObserver),
    {
        if let Some(history) = self.history.as_mut() {
            event(history);
        }
        if let Some(telemetry) = self.telemetry.as_mut() {
            event(telemetry);
        }
        for observer in self.custom.iter_mut() {
            event(observer.as_mut());
        }
    }
}
