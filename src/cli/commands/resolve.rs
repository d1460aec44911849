//! Resolve command implementation
//!
//! Prints the merged configuration as JSON. Secret values are masked unless
//! `--show-secrets` is given.

use super::overrides::ConnectionOverrides;
use super::{build_resolver, load_settings, EXIT_CONFIG_ERROR};
use crate::domain::errors::ConfluxError;
use crate::domain::parameters::is_sensitive_key;
use crate::domain::{ConfigMap, DiagnosticLevel};
use crate::resolution::ConfigurationResolver;
use clap::Args;
use serde_json::Value;

const MASK: &str = "****";

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Print only this connection
    #[arg(long)]
    pub connection: Option<String>,

    /// Print secret values in clear text
    #[arg(long)]
    pub show_secrets: bool,

    #[command(flatten)]
    pub overrides: ConnectionOverrides,
}

impl ResolveArgs {
    /// Execute the resolve command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(settings) = load_settings(config_path) else {
            return Ok(EXIT_CONFIG_ERROR);
        };

        let mut resolver = build_resolver(&settings, &self.overrides, false);
        self.run(&mut resolver)
    }

    /// Runs the command against an existing resolver
    pub fn run(&self, resolver: &mut ConfigurationResolver) -> anyhow::Result<i32> {
        let resolved = match resolver.resolve(None, None) {
            Ok(resolved) => resolved,
            Err(e @ ConfluxError::MalformedSourceOutput { .. }) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
            Err(e) => return Err(e.into()),
        };
        report_diagnostics(resolver);

        let mut output = match &self.connection {
            Some(name) => match resolved.require_connection(name) {
                Ok(params) => params.clone(),
                Err(e) => {
                    eprintln!("❌ {e}");
                    return Ok(EXIT_CONFIG_ERROR);
                }
            },
            None => resolved.to_nested(),
        };

        if !self.show_secrets {
            mask_secrets(&mut output);
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(0)
    }
}

/// Prints warnings and errors reported by the sources
pub(crate) fn report_diagnostics(resolver: &ConfigurationResolver) {
    for diagnostic in resolver.get_source_diagnostics() {
        if diagnostic.level >= DiagnosticLevel::Warning {
            eprintln!("⚠️  {}: {}", diagnostic.source_name, diagnostic.message);
        }
    }
}

/// Replaces values under secret-looking keys
pub fn mask_secrets(map: &mut ConfigMap) {
    for (key, value) in map.iter_mut() {
        if let Value::Object(nested) = value {
            mask_secrets(nested);
        } else if is_sensitive_key(key) && !value.is_null() {
            *value = Value::String(MASK.to_string());
        }
    }
}
