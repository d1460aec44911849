//! Configuration resolution engine.
//!
//! The [`ConfigurationResolver`] consults its sources in precedence order,
//! merges their output and reports every step to its observers. The
//! [`ResolutionHistoryTracker`] turns those events into a per-key audit
//! trail; the [`TelemetryObserver`] counts them.
//!
//! # Example
//!
//! ```rust
//! use conflux::resolution::ConfigurationResolver;
//! use conflux::sources::{CliArgumentsSource, EnvironmentScheme, EnvironmentSource};
//!
//! let mut resolver = ConfigurationResolver::builder()
//!     .source(EnvironmentSource::with_vars(
//!         EnvironmentScheme::Cli,
//!         [("SNOWFLAKE_ACCOUNT", "env-account")],
//!     ))
//!     .source(CliArgumentsSource::from_args(["--account", "cli-account"]))
//!     .build();
//!
//! let config = resolver.resolve(None, None).unwrap();
//! let default = config.connection("default").unwrap();
//! assert_eq!(default["account"], "cli-account");
//!
//! let history = resolver.get_resolution_history("account").unwrap();
//! assert_eq!(history.sources_consulted(), vec!["cli_env", "cli_arguments"]);
//! ```

pub mod export;
pub mod history;
pub mod merge;
pub mod observer;
pub mod resolver;
pub mod sanitize;
pub mod telemetry;

pub use export::HistoryExport;
pub use history::{ResolutionEntry, ResolutionHistory, ResolutionHistoryTracker, ResolutionSummary};
pub use observer::{Observer, ResolutionObserver};
pub use resolver::{ConfigurationResolver, ResolverBuilder};
pub use sanitize::sanitize_message;
pub use telemetry::{TelemetryObserver, TelemetrySnapshot};
