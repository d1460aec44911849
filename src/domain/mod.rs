//! Domain models and types for Conflux.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Discovered values** ([`ConfigValue`], [`SourceKind`], [`SourceDiagnostic`])
//! - **The merged tree** ([`ResolvedConfig`])
//! - **Connection parameter knowledge** ([`parameters`])
//! - **Error types** ([`ConfluxError`]) and the [`Result`] alias
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ConfluxError>`]:
//!
//! ```rust
//! use conflux::domain::{ResolvedConfig, Result};
//!
//! fn account_of(config: &ResolvedConfig, name: &str) -> Result<Option<String>> {
//!     let connection = config.require_connection(name)?;
//!     Ok(connection
//!         .get("account")
//!         .and_then(|v| v.as_str())
//!         .map(str::to_string))
//! }
//! ```

pub mod errors;
pub mod parameters;
pub mod resolved;
pub mod result;
pub mod value;

// Re-export commonly used types for convenience
pub use errors::ConfluxError;
pub use resolved::{connection_key, flatten_map, ResolvedConfig, CONNECTIONS_KEY};
pub use result::Result;
pub use value::{ConfigMap, ConfigValue, DiagnosticLevel, SourceDiagnostic, SourceKind};
