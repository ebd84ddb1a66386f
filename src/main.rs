// mwf-deid - MFER ECG de-identification tool
// Copyright (c) 2025 mwf-deid Contributors
// Licensed under the MIT License

use clap::Parser;
use mwf_deid::cli::{Cli, Commands};
use mwf_deid::config::{load_config_or_default, DeidConfig, LoggingConfig};
use mwf_deid::domain::DeidError;
use mwf_deid::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Session commands need the configuration before logging starts so the
    // log file location and level come from it
    let loaded = load_config_or_default(&cli.config);

    let logging_config = match &loaded {
        Ok(config) if cli.command.runs_sessions() => config.logging.clone(),
        _ => LoggingConfig {
            local_enabled: false,
            ..LoggingConfig::default()
        },
    };
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "mwf-deid - MFER ECG de-identification"
    );

    let exit_code = match execute_command(&cli, loaded).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // Flush the file writer before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(
    cli: &Cli,
    loaded: Result<DeidConfig, DeidError>,
) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => match loaded {
            Ok(config) => args.execute(&config).await,
            Err(e) => Ok(config_error(&e)),
        },
        Commands::Interactive(args) => match loaded {
            Ok(config) => args.execute(&config).await,
            Err(e) => Ok(config_error(&e)),
        },
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}

fn config_error(e: &DeidError) -> i32 {
    tracing::error!(error = %e, "Configuration error");
    eprintln!("Configuration error: {e}");
    2
}
