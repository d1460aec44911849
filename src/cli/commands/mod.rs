//! CLI command implementations
//!
//! Every command loads the settings file, builds the standard source chain
//! with the command-line overrides on top, and runs one resolution pass.

pub mod export_history;
pub mod history;
pub mod overrides;
pub mod resolve;

use crate::config::{load_or_default, AppConfig};
use crate::resolution::ConfigurationResolver;
use crate::sources::default_chain;
use overrides::ConnectionOverrides;

/// Exit code for configuration errors
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Loads settings, printing the error and returning `None` on failure
fn load_settings(config_path: &str) -> Option<AppConfig> {
    match load_or_default(config_path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::error!(error = %e, config_path = %config_path, "Failed to load settings");
            eprintln!("❌ Failed to load settings from {config_path}");
            eprintln!("   Error: {e}");
            None
        }
    }
}

/// Builds a resolver over the standard chain
fn build_resolver(
    settings: &AppConfig,
    overrides: &ConnectionOverrides,
    force_history: bool,
) -> ConfigurationResolver {
    let sources = default_chain(&settings.sources, Some(overrides.to_source()));
    ConfigurationResolver::builder()
        .sources(sources)
        .track_history(settings.history.enabled || force_history)
        .build()
}
