//! Configuration resolver
//!
//! Merges the output of an ordered list of value sources into one
//! [`ResolvedConfig`]. A pass runs four phases:
//!
//! 1. FILE sources replace connections and root keys wholesale.
//! 2. OVERLAY sources merge field by field; general parameters become
//!    defaults for every connection. Once all overlays are in, root-level
//!    general parameters also fill connections that appeared later.
//! 3. With no connections at all, free-standing parameters form a `default`
//!    connection.
//! 4. Observers are told the final result so the history can mark winners.
//!
//! A failing source is logged and skipped. Only malformed source output
//! aborts a pass.

use super::export::HistoryExport;
use super::history::{ResolutionHistory, ResolutionHistoryTracker, ResolutionSummary};
use super::merge::{deep_merge, merge_defaults, split_general, synthesize_default_connection};
use super::observer::{Observer, ObserverSet};
use super::sanitize::sanitize_message;
use super::telemetry::{TelemetryObserver, TelemetrySnapshot};
use crate::domain::parameters::{is_connection_parameter, DEFAULT_CONNECTION_NAME};
use crate::domain::{
    connection_key, flatten_map, ConfigMap, ConfigValue, ResolvedConfig, Result,
    SourceDiagnostic, SourceKind,
};
use crate::sources::ValueSource;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Builder for [`ConfigurationResolver`]
pub struct ResolverBuilder {
    sources: Vec<Box<dyn ValueSource>>,
    observers: Vec<Observer>,
    track_history: bool,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            observers: Vec::new(),
            track_history: true,
        }
    }
}

impl ResolverBuilder {
    /// Appends a source; later sources take precedence
    pub fn source(mut self, source: impl ValueSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Appends an already boxed source
    pub fn boxed_source(mut self, source: Box<dyn ValueSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Appends several sources in order
    pub fn sources(mut self, sources: impl IntoIterator<Item = Box<dyn ValueSource>>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Adds an observer
    ///
    /// Once any observer is given, no built-in observers are added
    /// implicitly.
    pub fn observer(mut self, observer: Observer) -> Self {
        self.observers.push(observer);
        self
    }

    /// Disables the implicit history tracker
    pub fn track_history(mut self, enabled: bool) -> Self {
        self.track_history = enabled;
        self
    }

    pub fn build(self) -> ConfigurationResolver {
        let mut observers = ObserverSet::default();
        if self.observers.is_empty() {
            observers.attach(Observer::Telemetry(TelemetryObserver::new()));
            if self.track_history {
                observers.attach(Observer::History(ResolutionHistoryTracker::new()));
            }
        } else {
            for observer in self.observers {
                observers.attach(observer);
            }
        }

        ConfigurationResolver {
            sources: self.sources,
            observers,
            diagnostics: Vec::new(),
        }
    }
}

/// Resolves configuration from ordered sources
pub struct ConfigurationResolver {
    sources: Vec<Box<dyn ValueSource>>,
    observers: ObserverSet,
    diagnostics: Vec<SourceDiagnostic>,
}

impl std::fmt::Debug for ConfigurationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationResolver")
            .field("sources", &self.sources())
            .field("history", &self.observers.history.is_some())
            .field("telemetry", &self.observers.telemetry.is_some())
            .field("custom_observers", &self.observers.custom.len())
            .finish()
    }
}

impl ConfigurationResolver {
    /// Creates a resolver with default observers
    pub fn new(sources: Vec<Box<dyn ValueSource>>) -> Self {
        Self::builder().sources(sources).build()
    }

    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    /// Runs a resolution pass
    ///
    /// With `key`, sources are asked only for that dotted path. With `key`
    /// and `default`, a key missing from the merged result is filled with
    /// `default`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedSourceOutput` if a source breaks the output
    /// contract, or `Validation` if `default` cannot be placed at `key`.
    /// Discovery failures are recorded as diagnostics instead.
    pub fn resolve(&mut self, key: Option<&str>, default: Option<Value>) -> Result<ResolvedConfig> {
        self.diagnostics.clear();
        self.observers.notify(|o| o.on_reset());

        let mut pass = MergePass {
            observers: &mut self.observers,
            diagnostics: &mut self.diagnostics,
            config: ResolvedConfig::new(),
            general: BTreeMap::new(),
            flat_view: BTreeSet::new(),
            broadcast_fields: BTreeSet::new(),
            failed: 0,
        };

        for source in self.sources.iter().filter(|s| s.source_kind() == SourceKind::File) {
            if let Some(data) = pass.discover(source.as_ref(), key) {
                pass.apply_file(source.as_ref(), data)?;
            }
        }

        for source in self.sources.iter().filter(|s| s.source_kind() == SourceKind::Overlay) {
            if let Some(data) = pass.discover(source.as_ref(), key) {
                pass.apply_overlay(source.as_ref(), data)?;
            }
        }
        pass.settle_general();

        pass.synthesize();

        if let (Some(key), Some(default)) = (key, default) {
            if lookup(&pass.config, key).is_none() {
                tracing::debug!(key = %key, "Key not found, using caller default");
                pass.config.set(key, default.clone())?;
                pass.observers.notify(|o| o.on_default_used(key, &default));
            }
        }

        let MergePass {
            observers,
            config,
            failed,
            ..
        } = pass;
        observers.notify(|o| o.on_finalize(&config));

        tracing::info!(
            sources = self.sources.len(),
            failed,
            connections = config.connections.len(),
            root_keys = config.root.len(),
            "Configuration resolved"
        );
        Ok(config)
    }

    /// Resolves a single dotted key
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_value(&mut self, key: &str, default: Option<Value>) -> Result<Option<Value>> {
        let config = self.resolve(Some(key), default)?;
        Ok(lookup(&config, key))
    }

    /// Attaches an observer for subsequent passes
    ///
    /// A built-in observer replaces the existing one of its kind.
    pub fn attach_observer(&mut self, observer: Observer) {
        self.observers.attach(observer);
    }

    /// Attaches a history tracker if none is present
    ///
    /// Returns true if a tracker was added.
    pub fn ensure_history_tracking(&mut self) -> bool {
        if self.observers.history.is_some() {
            return false;
        }
        self.observers
            .attach(Observer::History(ResolutionHistoryTracker::new()));
        true
    }

    /// History of one key from the last pass
    pub fn get_resolution_history(&self, key: &str) -> Option<&ResolutionHistory> {
        self.observers.history.as_ref()?.get(key)
    }

    /// All histories from the last pass
    pub fn get_all_histories(&self) -> BTreeMap<String, ResolutionHistory> {
        self.observers
            .history
            .as_ref()
            .map(|tracker| tracker.histories().clone())
            .unwrap_or_default()
    }

    /// Summary of the last pass, if history is tracked
    pub fn get_resolution_summary(&self) -> Option<ResolutionSummary> {
        self.observers
            .history
            .as_ref()
            .map(ResolutionHistoryTracker::get_summary)
    }

    /// Diagnostics collected during the last pass
    pub fn get_source_diagnostics(&self) -> &[SourceDiagnostic] {
        &self.diagnostics
    }

    /// Telemetry counters, if telemetry is attached
    pub fn telemetry(&self) -> Option<TelemetrySnapshot> {
        self.observers.telemetry.as_ref().map(TelemetryObserver::snapshot)
    }

    /// Export document of the last pass, if history is tracked
    pub fn export_history(&self, redact: bool) -> Option<HistoryExport> {
        self.observers
            .history
            .as_ref()
            .map(|tracker| HistoryExport::from_tracker(tracker, redact))
    }

    /// Names and kinds of the sources, in precedence order
    pub fn sources(&self) -> Vec<(&str, SourceKind)> {
        self.sources
            .iter()
            .map(|s| (s.source_name(), s.source_kind()))
            .collect()
    }
}

/// Looks up `key`, following a bare parameter into the synthesized connection
fn lookup(config: &ResolvedConfig, key: &str) -> Option<Value> {
    config.value_at(key).or_else(|| {
        if key.contains('.') {
            None
        } else {
            config
                .get(&connection_key(DEFAULT_CONNECTION_NAME, key))
                .cloned()
        }
    })
}

/// State of one resolution pass
struct MergePass<'a> {
    observers: &'a mut ObserverSet,
    diagnostics: &'a mut Vec<SourceDiagnostic>,
    config: ResolvedConfig,
    /// Latest root-level general parameter per key, with its origin
    general: BTreeMap<String, ConfigValue>,
    /// General parameters broadcast while connections existed; these stay at
    /// the root as the flat view
    flat_view: BTreeSet<String>,
    /// Connection fields filled by a general parameter rather than set for
    /// the connection itself
    broadcast_fields: BTreeSet<(String, String)>,
    failed: usize,
}

impl MergePass<'_> {
    /// Asks a source for data, recording failures and diagnostics
    fn discover(&mut self, source: &dyn ValueSource, key: Option<&str>) -> Option<ConfigMap> {
        let name = source.source_name();
        let outcome = source.discover(key);
        self.diagnostics.extend(source.consume_diagnostics());

        match outcome {
            Ok(data) => {
                tracing::debug!(source = %name, keys = data.len(), "Source discovered");
                Some(data)
            }
            Err(e) => {
                let message = sanitize_message(&e.to_string());
                tracing::warn!(source = %name, error = %message, "Source failed, skipping");
                self.diagnostics
                    .push(SourceDiagnostic::error(name, message.clone()));
                self.observers.notify(|o| o.on_source_failed(name, &message));
                self.failed += 1;
                None
            }
        }
    }

    /// Tells observers about a source's data, as a whole and per leaf
    fn announce(&mut self, source: &dyn ValueSource, data: &ConfigMap, kind: SourceKind) {
        let name = source.source_name();
        self.observers
            .notify(|o| o.on_nested_discovery(data, name, kind));
        for (key, value) in flatten_map(data) {
            let config_value =
                ConfigValue::new(key.as_str(), value, name, kind).with_raw_value(source.raw_text(&key));
            self.observers.notify(|o| o.on_discovery(&key, &config_value));
        }
    }

    /// Remembers root-level general parameters and where they came from
    fn note_general(&mut self, source: &dyn ValueSource, root: &ConfigMap, kind: SourceKind) {
        for (key, value) in root {
            if !is_connection_parameter(key) || value.is_object() {
                continue;
            }
            let config_value = ConfigValue::new(key.as_str(), value.clone(), source.source_name(), kind)
                .with_raw_value(source.raw_text(key));
            self.general.insert(key.clone(), config_value);
        }
    }

    fn apply_file(&mut self, source: &dyn ValueSource, data: ConfigMap) -> Result<()> {
        let nested = ResolvedConfig::from_nested(data.clone(), source.source_name())?;
        self.announce(source, &data, SourceKind::File);
        self.note_general(source, &nested.root, SourceKind::File);

        for (key, value) in nested.root {
            self.config.root.insert(key, value);
        }
        for (name, params) in nested.connections {
            self.config.connections.insert(name, params);
        }
        Ok(())
    }

    fn apply_overlay(&mut self, source: &dyn ValueSource, data: ConfigMap) -> Result<()> {
        let nested = ResolvedConfig::from_nested(data.clone(), source.source_name())?;
        self.announce(source, &data, SourceKind::Overlay);

        let (general, other) = split_general(nested.root);
        deep_merge(&mut self.config.root, &other);
        for (name, params) in nested.connections {
            for key in params.keys() {
                self.broadcast_fields.remove(&(name.clone(), key.clone()));
            }
            deep_merge(self.config.connections.entry(name).or_default(), &params);
        }

        if general.is_empty() {
            return Ok(());
        }

        self.note_general(source, &general, SourceKind::Overlay);
        if !self.config.connections.is_empty() {
            self.flat_view.extend(general.keys().cloned());
            self.broadcast(&general, source);
        }
        deep_merge(&mut self.config.root, &general);
        Ok(())
    }

    /// Applies general parameters under every connection
    ///
    /// A field set specifically for a connection is kept; a field that came
    /// from an earlier broadcast is replaced.
    fn broadcast(&mut self, general: &ConfigMap, source: &dyn ValueSource) {
        for (connection, params) in self.config.connections.iter_mut() {
            for (key, value) in general {
                let field = (connection.clone(), key.clone());
                if params.contains_key(key) && !self.broadcast_fields.contains(&field) {
                    continue;
                }
                params.insert(key.clone(), value.clone());
                self.broadcast_fields.insert(field);

                let config_value = ConfigValue::new(
                    connection_key(connection, key),
                    value.clone(),
                    source.source_name(),
                    SourceKind::Overlay,
                )
                .with_raw_value(source.raw_text(key));
                self.observers
                    .notify(|o| o.on_general_broadcast(connection, &config_value));
            }
        }
    }

    /// Merges root-level general parameters as a base layer under every
    /// connection once all overlays are applied
    ///
    /// Covers connections created after a broadcast and general parameters
    /// that only ever sat at the root. Parameters that were never broadcast
    /// leave the root; broadcast ones stay as the flat view.
    fn settle_general(&mut self) {
        if self.config.connections.is_empty() {
            return;
        }

        let root = &self.config.root;
        let general: BTreeMap<String, ConfigValue> = std::mem::take(&mut self.general)
            .into_iter()
            .filter(|(key, config_value)| root.get(key) == Some(&config_value.value))
            .collect();
        if general.is_empty() {
            return;
        }

        let defaults: ConfigMap = general
            .iter()
            .map(|(key, config_value)| (key.clone(), config_value.value.clone()))
            .collect();
        for (connection, params) in self.config.connections.iter_mut() {
            for key in merge_defaults(params, &defaults) {
                let Some(config_value) = general.get(&key) else {
                    continue;
                };
                let broadcast = config_value.rekeyed(connection_key(connection, &key));
                self.observers
                    .notify(|o| o.on_general_broadcast(connection, &broadcast));
            }
        }
        for key in general.keys() {
            if !self.flat_view.contains(key) {
                self.config.root.remove(key);
            }
        }
    }

    fn synthesize(&mut self) {
        let keys = synthesize_default_connection(&mut self.config);
        if keys.is_empty() {
            return;
        }
        tracing::debug!(keys = ?keys, "Synthesized default connection");
        self.observers
            .notify(|o| o.on_connection_synthesized(DEFAULT_CONNECTION_NAME, &keys));
    }
}
