//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - human-readable console output on stderr, so command output on stdout
//!   stays machine-readable
//! - optional JSON log files with daily or hourly rotation
//!
//! # Example
//!
//! ```no_run
//! use conflux::config::LoggingConfig;
//! use conflux::logging::init_logging;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(source = "cli_env", "Source discovered");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};
