//! History command implementation
//!
//! Shows every candidate considered for one key, in consultation order.

use super::overrides::ConnectionOverrides;
use super::resolve::report_diagnostics;
use super::{build_resolver, load_settings, EXIT_CONFIG_ERROR};
use crate::domain::parameters::is_sensitive_key;
use crate::resolution::export::fingerprint;
use crate::resolution::{ConfigurationResolver, ResolutionHistory};
use clap::Args;
use serde_json::Value;

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Dotted key, e.g. `connections.prod.user` or just `user`
    pub key: String,

    /// Print secret values in clear text
    #[arg(long)]
    pub show_secrets: bool,

    #[command(flatten)]
    pub overrides: ConnectionOverrides,
}

impl HistoryArgs {
    /// Execute the history command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(settings) = load_settings(config_path) else {
            return Ok(EXIT_CONFIG_ERROR);
        };

        let mut resolver = build_resolver(&settings, &self.overrides, true);
        self.run(&mut resolver)
    }

    /// Runs the command against an existing resolver
    pub fn run(&self, resolver: &mut ConfigurationResolver) -> anyhow::Result<i32> {
        resolver.ensure_history_tracking();
        resolver.resolve(None, None)?;
        report_diagnostics(resolver);

        let Some(history) = resolver.get_resolution_history(&self.key) else {
            println!("No source provided a value for '{}'", self.key);
            return Ok(EXIT_CONFIG_ERROR);
        };

        print!("{}", render(history, self.show_secrets));
        Ok(0)
    }
}

fn render(history: &ResolutionHistory, show_secrets: bool) -> String {
    let mask = !show_secrets && is_sensitive_key(&history.key);
    let shown = |value: &Value| {
        if mask {
            fingerprint(value)
        } else {
            value.to_string()
        }
    };

    let mut out = format!("Key: {}\n", history.key);
    match &history.final_value {
        Some(value) => out.push_str(&format!("Final value: {}\n", shown(value))),
        None => out.push_str("Final value: <not resolved>\n"),
    }
    if history.default_used {
        out.push_str("Default used: yes\n");
    }

    for (priority, entry) in history.entries.iter().enumerate() {
        let status = if entry.was_used {
            "used".to_string()
        } else if let Some(winner) = &entry.overridden_by {
            format!("overridden by {winner}")
        } else {
            "not used".to_string()
        };
        out.push_str(&format!(
            "  [{priority}] {:<28} {:<30} {status}\n",
            entry.source_name(),
            shown(entry.value())
        ));
    }
    out
}
