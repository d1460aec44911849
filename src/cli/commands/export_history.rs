//! Export-history command implementation

use super::overrides::ConnectionOverrides;
use super::resolve::report_diagnostics;
use super::{build_resolver, load_settings, EXIT_CONFIG_ERROR};
use crate::resolution::ConfigurationResolver;
use clap::Args;

/// Arguments for the export-history command
#[derive(Args, Debug)]
pub struct ExportHistoryArgs {
    /// Output file; prints to stdout when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Replace secret values with fingerprints (defaults to history.redact_exports)
    #[arg(long)]
    pub redact: Option<bool>,

    #[command(flatten)]
    pub overrides: ConnectionOverrides,
}

impl ExportHistoryArgs {
    /// Execute the export-history command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(settings) = load_settings(config_path) else {
            return Ok(EXIT_CONFIG_ERROR);
        };

        let mut resolver = build_resolver(&settings, &self.overrides, true);
        let redact = self.redact.unwrap_or(settings.history.redact_exports);
        self.run(&mut resolver, redact)
    }

    /// Runs the command against an existing resolver
    pub fn run(&self, resolver: &mut ConfigurationResolver, redact: bool) -> anyhow::Result<i32> {
        resolver.ensure_history_tracking();
        resolver.resolve(None, None)?;
        report_diagnostics(resolver);

        let Some(export) = resolver.export_history(redact) else {
            anyhow::bail!("history tracking is not attached");
        };

        match &self.output {
            Some(path) => {
                export.write_to(path)?;
                tracing::info!(path = %path, keys = export.histories.len(), redact, "History exported");
                println!("✅ Exported {} keys to {path}", export.histories.len());
            }
            None => println!("{}", export.to_json_pretty()?),
        }
        Ok(0)
    }
}
