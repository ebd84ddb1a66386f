//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file.

use crate::config::{load_config, StoreBackend};
use crate::core::manifest::ManifestProcessor;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also applies environment overrides and validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let encoding = match ManifestProcessor::new(&config.manifest) {
            Ok(p) => p.encoding_name(),
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Output Root: {}", config.paths.output_root.display());
        println!("  Browse Root: {}", config.paths.browse_root.display());
        println!("  Manifest Encoding: {encoding}");
        println!("  Redacted Suffix: {}", config.manifest.redacted_suffix);
        println!("  Recording Extension: .{}", config.executor.extension);
        println!(
            "  Transform Timeout: {}",
            config
                .executor
                .transform_timeout_secs
                .map(|s| format!("{s}s"))
                .unwrap_or_else(|| "none".to_string())
        );
        println!(
            "  Max Concurrency: {}",
            config
                .executor
                .max_concurrency
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unbounded".to_string())
        );
        match config.store.backend {
            StoreBackend::JsonLines => {
                println!("  Pseudonym Store: json_lines ({})", config.store.path.display())
            }
            StoreBackend::Memory => println!("  Pseudonym Store: memory"),
        }
        if config.logging.local_enabled {
            println!(
                "  Log File: {}/{} ({})",
                config.logging.local_path,
                config.logging.local_file_name,
                config.logging.local_rotation
            );
        }
        println!();
        Ok(0)
    }
}
