//! Run command implementation
//!
//! This module implements the `run` command: one non-interactive
//! de-identification session.

use super::{build_controller, exit_code, print_report, DEFAULT_SECRET_ENV};
use crate::cli::prompt::read_secret;
use crate::config::{secret_string, DeidConfig, SecretString};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Manifest CSV listing recordings and patient identifiers
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Directory searched recursively for the listed recordings
    #[arg(short, long)]
    pub search_root: PathBuf,

    /// Environment variable holding the secret key; prompts when unset
    #[arg(long, default_value = DEFAULT_SECRET_ENV)]
    pub secret_env: String,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config: &DeidConfig) -> anyhow::Result<i32> {
        tracing::info!(
            manifest = %self.manifest.display(),
            search_root = %self.search_root.display(),
            "Starting run command"
        );

        let secret = self.secret()?;

        let controller = match build_controller(config) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize session controller");
                eprintln!("Failed to initialize: {e}");
                return Ok(2);
            }
        };

        let mut session = match controller.begin(secret, &self.manifest, &self.search_root) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open session");
                eprintln!("❌ {e}");
                return Ok(5);
            }
        };

        println!("🚀 Processing {}", self.manifest.display());

        match controller.run(&mut session).await {
            Ok(report) => {
                print_report(&report);
                Ok(exit_code(&report.summary))
            }
            Err(e) => {
                tracing::error!(error = %e, "Run aborted");
                eprintln!("❌ Run aborted: {e}");
                Ok(5)
            }
        }
    }

    fn secret(&self) -> anyhow::Result<SecretString> {
        match std::env::var(&self.secret_env) {
            Ok(value) if !value.is_empty() => {
                tracing::debug!(env = %self.secret_env, "Secret key read from environment");
                Ok(secret_string(value))
            }
            _ => read_secret("Secret key: ", &self.secret_env),
        }
    }
}
