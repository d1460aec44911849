//! Shared plumbing for file-backed sources
//!
//! Handles existence checks, permission checks, parse caching and
//! diagnostic collection so that format adapters only deal with parsing.

use crate::domain::{ConfigMap, ConfluxError, Result, SourceDiagnostic};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

/// What to do with a configuration file readable by group or others
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    /// Do not check permissions
    Ignore,
    /// Report a warning diagnostic and read the file anyway
    #[default]
    Warn,
    /// Report a warning diagnostic and skip the file
    Skip,
}

/// Reads a configuration file once and remembers the parsed result
#[derive(Debug)]
pub(crate) struct CachedFile {
    source_name: String,
    path: PathBuf,
    policy: PermissionPolicy,
    parsed: OnceLock<ConfigMap>,
    diagnostics: Mutex<Vec<SourceDiagnostic>>,
}

impl CachedFile {
    pub(crate) fn new(source_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            source_name: source_name.into(),
            path: path.into(),
            policy: PermissionPolicy::default(),
            parsed: OnceLock::new(),
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_policy(&mut self, policy: PermissionPolicy) {
        self.policy = policy;
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the parsed file, parsing it on first use
    ///
    /// A missing file is not cached, so a file created later is picked up.
    pub(crate) fn load<F>(&self, parse: F) -> Result<ConfigMap>
    where
        F: FnOnce(&str) -> Result<ConfigMap>,
    {
        if let Some(parsed) = self.parsed.get() {
            return Ok(parsed.clone());
        }

        if !self.path.exists() {
            tracing::debug!(
                source = %self.source_name,
                path = %self.path.display(),
                "Configuration file not found"
            );
            return Ok(ConfigMap::new());
        }

        if self.policy != PermissionPolicy::Ignore && permissions_too_open(&self.path)? {
            let skip = self.policy == PermissionPolicy::Skip;
            let message = if skip {
                format!(
                    "file permissions too open on {}, skipped",
                    self.path.display()
                )
            } else {
                format!("file permissions too open on {}", self.path.display())
            };
            tracing::warn!(source = %self.source_name, "{message}");
            self.push_diagnostic(SourceDiagnostic::warning(&self.source_name, message));

            if skip {
                let _ = self.parsed.set(ConfigMap::new());
                return Ok(ConfigMap::new());
            }
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ConfluxError::Configuration(format!(
                "Failed to read configuration file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let parsed = parse(&contents)?;
        let _ = self.parsed.set(parsed.clone());
        Ok(parsed)
    }

    pub(crate) fn push_diagnostic(&self, diagnostic: SourceDiagnostic) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.push(diagnostic);
        }
    }

    pub(crate) fn drain_diagnostics(&self) -> Vec<SourceDiagnostic> {
        match self.diagnostics.lock() {
            Ok(mut diagnostics) => std::mem::take(&mut *diagnostics),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(unix)]
fn permissions_too_open(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(path)?.permissions().mode();
    Ok(mode & 0o077 != 0)
}

#[cfg(not(unix))]
fn permissions_too_open(_path: &Path) -> Result<bool> {
    Ok(false)
}

/// Expands a leading `~` to the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
