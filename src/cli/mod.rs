//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for mwf-deid using clap.

pub mod commands;
pub mod prompt;

use clap::{Parser, Subcommand};

/// mwf-deid - MFER ECG de-identification
#[derive(Parser, Debug)]
#[command(name = "mwf-deid")]
#[command(version, about, long_about = None)]
#[command(author = "mwf-deid Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "mwf-deid.toml", env = "MWF_DEID_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MWF_DEID_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// De-identify one manifest and its recordings
    Run(commands::run::RunArgs),

    /// Prompt for inputs and process manifests until told to stop
    Interactive(commands::interactive::InteractiveArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Commands {
    /// Whether the command runs sessions and should log to file
    pub fn runs_sessions(&self) -> bool {
        matches!(self, Commands::Run(_) | Commands::Interactive(_))
    }
}
