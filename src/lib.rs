// Conflux - Connection Configuration Resolver
// Copyright (c) 2025 Conflux Contributors
// Licensed under the MIT License

//! # Conflux - Connection Configuration Resolution
//!
//! Conflux merges connection settings from legacy INI files, TOML files,
//! environment variables and command-line flags into one configuration
//! tree, and records for every key which source supplied it and why it won.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`resolution`] - The resolver, its merge phases and observers
//! - [`sources`] - Value sources (files, environment, CLI flags)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Conflux's own settings file
//! - [`logging`] - Structured logging
//!
//! ## Merge Model
//!
//! Sources are consulted lowest precedence first. FILE sources own whole
//! connections: a connection defined by two files comes entirely from the
//! later one. OVERLAY sources (environment, flags) merge field by field, and
//! their free-standing parameters such as `account` become defaults for every
//! connection. When no connection is defined anywhere, free-standing
//! parameters form a connection named `default`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use conflux::config::load_or_default;
//! use conflux::resolution::ConfigurationResolver;
//! use conflux::sources::default_chain;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = load_or_default("conflux.toml")?;
//! let mut resolver = ConfigurationResolver::new(default_chain(&settings.sources, None));
//!
//! let config = resolver.resolve(None, None)?;
//! for name in config.connection_names() {
//!     println!("connection: {name}");
//! }
//!
//! if let Some(history) = resolver.get_resolution_history("account") {
//!     println!("account came from {:?}", history.selected_entry().map(|e| e.source_name()));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`]. A source that fails to read
//! or parse is skipped and reported through
//! [`ConfigurationResolver::get_source_diagnostics`](resolution::ConfigurationResolver::get_source_diagnostics);
//! only malformed source output aborts a resolution.

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod resolution;
pub mod sources;
