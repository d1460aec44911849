//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Conflux using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Conflux - connection configuration resolver
#[derive(Parser, Debug)]
#[command(name = "conflux")]
#[command(version, about, long_about = None)]
#[command(author = "Conflux Contributors")]
pub struct Cli {
    /// Path to the Conflux settings file
    #[arg(short, long, default_value = "conflux.toml", env = "CONFLUX_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CONFLUX_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve and print the merged configuration
    Resolve(commands::resolve::ResolveArgs),

    /// Show which sources supplied a key and which one won
    History(commands::history::HistoryArgs),

    /// Write the resolution history of every key as JSON
    ExportHistory(commands::export_history::ExportHistoryArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_resolve() {
        let cli = Cli::parse_from(["conflux", "resolve"]);
        assert_eq!(cli.config, "conflux.toml");
        assert!(matches!(cli.command, Commands::Resolve(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["conflux", "--config", "custom.toml", "resolve"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["conflux", "--log-level", "debug", "resolve"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_resolve_with_overrides() {
        let cli = Cli::parse_from([
            "conflux",
            "resolve",
            "--connection",
            "prod",
            "--account",
            "acct",
            "--port",
            "443",
        ]);
        let Commands::Resolve(args) = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(args.connection.as_deref(), Some("prod"));
        assert_eq!(args.overrides.account.as_deref(), Some("acct"));
        assert_eq!(args.overrides.port.as_ref().map(|p| p.port), Some(443));
    }

    #[test]
    fn test_cli_parse_history() {
        let cli = Cli::parse_from(["conflux", "history", "connections.prod.user"]);
        let Commands::History(args) = cli.command else {
            panic!("expected history");
        };
        assert_eq!(args.key, "connections.prod.user");
    }

    #[test]
    fn test_cli_parse_export_history() {
        let cli = Cli::parse_from([
            "conflux",
            "export-history",
            "--output",
            "history.json",
            "--redact",
            "false",
        ]);
        let Commands::ExportHistory(args) = cli.command else {
            panic!("expected export-history");
        };
        assert_eq!(args.output.as_deref(), Some("history.json"));
        assert_eq!(args.redact, Some(false));
    }
}
