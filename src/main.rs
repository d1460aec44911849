// Conflux - Connection Configuration Resolver
// Copyright (c) 2025 Conflux Contributors
// Licensed under the MIT License

use clap::Parser;
use conflux::cli::{Cli, Commands};
use conflux::config::{load_or_default, LoggingConfig};
use conflux::logging::init_logging;
use std::process;

fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Settings errors are reported by the command itself
    let logging_config = load_or_default(&cli.config)
        .map(|settings| settings.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    let log_level = cli.log_level.as_deref().unwrap_or("warn");
    let guard = match init_logging(log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Conflux starting");

    let exit_code = match execute_command(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(exit_code);
}

fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Resolve(args) => args.execute(&cli.config),
        Commands::History(args) => args.execute(&cli.config),
        Commands::ExportHistory(args) => args.execute(&cli.config),
    }
}
