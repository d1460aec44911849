//! Configuration management for Conflux itself.
//!
//! This module loads `conflux.toml`, the tool's own settings: which files
//! and environment schemes feed the resolver, whether resolution history is
//! tracked, and how logging is set up. Connection settings never live here.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use conflux::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("conflux.toml")?;
//! println!("config.toml: {}", config.sources.config_toml_path);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [sources]
//! legacy_config_paths = ["/etc/snowsql.cnf", "~/.snowsql/config"]
//! config_toml_path = "~/.snowflake/config.toml"
//! connections_toml_path = "~/.snowflake/connections.toml"
//! environment_enabled = true
//! permission_policy = "warn"
//!
//! [history]
//! enabled = true
//! redact_exports = true
//!
//! [logging]
//! local_enabled = false
//! local_path = "${HOME}/.conflux/logs"
//! local_rotation = "daily"
//! ```
//!
//! # Environment Variables
//!
//! `${VAR_NAME}` placeholders are substituted before parsing, and any
//! setting can be overridden with `CONFLUX_<SECTION>_<KEY>`:
//!
//! ```bash
//! export CONFLUX_SOURCES_CONFIG_TOML_PATH=/opt/snowflake/config.toml
//! export CONFLUX_HISTORY_ENABLED=false
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_or_default};
pub use schema::{AppConfig, HistoryConfig, LoggingConfig, SourcesConfig};
pub use secret::{secret_string, secret_string_opt, SecretArg, SecretString, SecretValue};
