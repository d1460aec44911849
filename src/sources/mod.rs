//! Configuration value sources.
//!
//! Every source implements [`ValueSource`] and is either a FILE source
//! (defines whole connections) or an OVERLAY source (supplies sparse fields):
//!
//! - [`LegacyIniSource`] - snowsql INI files (FILE)
//! - [`TomlFileSource`] - `config.toml` and `connections.toml` (FILE)
//! - [`EnvironmentSource`] - environment variables (OVERLAY)
//! - [`CliArgumentsSource`] - command-line flags (OVERLAY)
//!
//! # Standard Chain
//!
//! [`default_chain`] builds the sources in ascending precedence:
//!
//! ```rust,no_run
//! use conflux::config::SourcesConfig;
//! use conflux::sources::{default_chain, CliArgumentsSource};
//!
//! let cli = CliArgumentsSource::from_args(["--account", "acct"]);
//! let sources = default_chain(&SourcesConfig::default(), Some(cli));
//! for source in &sources {
//!     println!("{} ({})", source.source_name(), source.source_kind());
//! }
//! ```

pub mod cli_arguments;
pub mod environment;
pub mod file;
pub mod legacy_ini;
pub mod toml_file;
pub mod traits;

pub use cli_arguments::{CliArgumentsSource, CLI_ARGUMENTS};
pub use environment::{EnvironmentScheme, EnvironmentSource};
pub use file::{expand_home, PermissionPolicy};
pub use legacy_ini::{LegacyIniSource, SNOWSQL_CONFIG};
pub use toml_file::{TomlFileSource, TomlLayout, CLI_CONFIG_TOML, CONNECTIONS_TOML};
pub use traits::{select_key, ValueSource};

use crate::config::SourcesConfig;

/// Builds the standard source chain, lowest precedence first
///
/// Order: legacy INI files, `config.toml`, `connections.toml`, snowsql
/// environment, connection-scoped environment, CLI environment, then
/// command-line arguments.
pub fn default_chain(
    settings: &SourcesConfig,
    cli_arguments: Option<CliArgumentsSource>,
) -> Vec<Box<dyn ValueSource>> {
    let policy = settings.permission_policy;
    let mut sources: Vec<Box<dyn ValueSource>> = Vec::new();

    // Histories are keyed by source name, so several legacy files need
    // distinct names.
    let legacy_count = settings.legacy_config_paths.len();
    for path in &settings.legacy_config_paths {
        let name = if legacy_count == 1 {
            SNOWSQL_CONFIG.to_string()
        } else {
            format!("{SNOWSQL_CONFIG}:{path}")
        };
        sources.push(Box::new(
            LegacyIniSource::named(name, expand_home(path)).with_permission_policy(policy),
        ));
    }

    sources.push(Box::new(
        TomlFileSource::cli_config(expand_home(&settings.config_toml_path))
            .with_permission_policy(policy),
    ));
    sources.push(Box::new(
        TomlFileSource::connections(expand_home(&settings.connections_toml_path))
            .with_permission_policy(policy),
    ));

    if settings.environment_enabled {
        for scheme in [
            EnvironmentScheme::Snowsql,
            EnvironmentScheme::ConnectionScoped,
            EnvironmentScheme::Cli,
        ] {
            sources.push(Box::new(EnvironmentSource::new(scheme)));
        }
    }

    if let Some(cli_arguments) = cli_arguments {
        sources.push(Box::new(cli_arguments));
    }

    tracing::debug!(count = sources.len(), "Built source chain");
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceKind;

    #[test]
    fn test_default_chain_order() {
        let settings = SourcesConfig {
            legacy_config_paths: vec!["/nonexistent/a.cnf".to_string()],
            ..SourcesConfig::default()
        };
        let sources = default_chain(&settings, Some(CliArgumentsSource::default()));
        let names: Vec<&str> = sources.iter().map(|s| s.source_name()).collect();
        assert_eq!(
            names,
            vec![
                SNOWSQL_CONFIG,
                CLI_CONFIG_TOML,
                CONNECTIONS_TOML,
                "snowsql_env",
                "connection_specific_env",
                "cli_env",
                CLI_ARGUMENTS,
            ]
        );

        let first_overlay = sources
            .iter()
            .position(|s| s.source_kind() == SourceKind::Overlay)
            .unwrap();
        assert!(sources[..first_overlay]
            .iter()
            .all(|s| s.source_kind() == SourceKind::File));
    }

    #[test]
    fn test_default_chain_names_each_legacy_file() {
        let settings = SourcesConfig {
            legacy_config_paths: vec!["/etc/snowsql.cnf".to_string(), "~/.snowsql/config".to_string()],
            environment_enabled: false,
            ..SourcesConfig::default()
        };
        let sources = default_chain(&settings, None);
        assert_eq!(sources[0].source_name(), "snowsql_config:/etc/snowsql.cnf");
        assert_eq!(sources[1].source_name(), "snowsql_config:~/.snowsql/config");
    }

    #[test]
    fn test_default_chain_without_environment() {
        let settings = SourcesConfig {
            legacy_config_paths: Vec::new(),
            environment_enabled: false,
            ..SourcesConfig::default()
        };
        let sources = default_chain(&settings, None);
        assert_eq!(sources.len(), 2);
    }
}
