//! Domain error types
//!
//! This module defines the error hierarchy for Conflux.
//! Errors carry plain strings and never expose third-party types.

use thiserror::Error;

/// Main Conflux error type
///
/// Source failures are normally recovered inside the resolver; the variants
/// that escape `resolve()` are contract violations and caller-side lookups.
#[derive(Debug, Error)]
pub enum ConfluxError {
    /// Configuration-related errors (tool settings, unreadable files)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A value source failed while discovering values
    #[error("Source '{source_name}' failed: {message}")]
    SourceDiscovery {
        /// Name of the failing source
        source_name: String,
        /// Failure description
        message: String,
    },

    /// A value source returned data that violates the source contract
    #[error("Source '{source_name}' returned malformed output: {message}")]
    MalformedSourceOutput {
        /// Name of the offending source
        source_name: String,
        /// What was malformed
        message: String,
    },

    /// A requested connection is absent from the merged configuration
    #[error("Connection '{0}' is not configured")]
    MissingConnection(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl ConfluxError {
    /// Creates a source discovery error
    pub fn source_discovery(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ConfluxError::SourceDiscovery {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a malformed output error
    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ConfluxError::MalformedSourceOutput {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ConfluxError {
    fn from(err: std::io::Error) -> Self {
        ConfluxError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ConfluxError {
    fn from(err: serde_json::Error) -> Self {
        ConfluxError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ConfluxError {
    fn from(err: toml::de::Error) -> Self {
        ConfluxError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from INI parse errors raised through the config crate
impl From<config::ConfigError> for ConfluxError {
    fn from(err: config::ConfigError) -> Self {
        ConfluxError::Configuration(format!("INI parse error: {err}"))
    }
}
