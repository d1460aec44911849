//! History export document
//!
//! Serializes the tracker into a stable JSON shape for audits. With redaction
//! enabled, values under secret-looking keys are replaced by a short SHA-256
//! fingerprint so equal secrets remain comparable.

use super::history::{ResolutionHistory, ResolutionHistoryTracker, ResolutionSummary};
use crate::domain::parameters::is_sensitive_key;
use crate::domain::Result;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// One candidate in an exported history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedEntry {
    pub source: String,
    pub value: Value,
    /// Position in consultation order
    pub priority: usize,
    pub was_used: bool,
    pub overridden_by: Option<String>,
}

/// One key in the export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedHistory {
    pub key: String,
    pub final_value: Option<Value>,
    pub default_used: bool,
    pub sources_consulted: Vec<String>,
    pub entries: Vec<ExportedEntry>,
}

/// Complete export of one resolution pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryExport {
    pub summary: ResolutionSummary,
    pub histories: BTreeMap<String, ExportedHistory>,
}

impl HistoryExport {
    /// Builds the export from a tracker
    pub fn from_tracker(tracker: &ResolutionHistoryTracker, redact: bool) -> Self {
        let histories = tracker
            .histories()
            .iter()
            .map(|(key, history)| (key.clone(), export_history(history, redact)))
            .collect();
        Self {
            summary: tracker.get_summary(),
            histories,
        }
    }

    /// Renders the export as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the document cannot be encoded.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the export to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

fn export_history(history: &ResolutionHistory, redact: bool) -> ExportedHistory {
    let mask = redact && is_sensitive_key(&history.key);
    let shown = |value: &Value| {
        if mask {
            Value::String(fingerprint(value))
        } else {
            value.clone()
        }
    };

    ExportedHistory {
        key: history.key.clone(),
        final_value: history.final_value.as_ref().map(shown),
        default_used: history.default_used,
        sources_consulted: history
            .sources_consulted()
            .into_iter()
            .map(str::to_string)
            .collect(),
        entries: history
            .entries
            .iter()
            .enumerate()
            .map(|(priority, entry)| ExportedEntry {
                source: entry.source_name().to_string(),
                value: shown(entry.value()),
                priority,
                was_used: entry.was_used,
                overridden_by: entry.overridden_by.clone(),
            })
            .collect(),
    }
}

/// Short, stable stand-in for a secret value
pub fn fingerprint(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let digest = Sha256::digest(text.as_bytes());
    let hex: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    format!("<redacted sha256:{hex}>")
}
