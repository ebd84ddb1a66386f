//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "mwf-deid.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing mwf-deid configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} and set paths.output_root", self.output);
                println!("  2. Check manifest.encoding matches your manifest exports");
                println!("  3. Validate configuration: mwf-deid validate-config");
                println!("  4. Start a session: mwf-deid interactive");
                println!("     or: MWF_DEID_SECRET=... mwf-deid run --manifest list.csv --search-root /data");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# mwf-deid Configuration File
# MFER ECG de-identification

[application]
log_level = "info"

[paths]
output_root = "./anonymized"
browse_root = "."

[manifest]
encoding = "shift_jis"
redacted_suffix = "_anonymized"

[executor]
extension = "mwf"

[store]
backend = "json_lines"
path = "./pseudonyms/pseudonyms.jsonl"

[logging]
local_enabled = true
local_path = "./logs"
local_file_name = "mwf-deid.log"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# mwf-deid Configuration File
# MFER ECG de-identification
#
# Values may reference environment variables as ${VAR}. Every key can also be
# overridden with MWF_DEID_<SECTION>_<KEY>, e.g. MWF_DEID_PATHS_OUTPUT_ROOT.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Paths
# ============================================================================
[paths]
# Each run writes into <output_root>/<YYYY-MM-DD-HHMMSS>/
# (legacy override: ANNONYMIZED_DATA_DIR)
output_root = "./anonymized"

# Directory the interactive manifest browser opens in
# (legacy override: CURRENT_DIR)
browse_root = "."

# ============================================================================
# Manifest
# ============================================================================
[manifest]
# Encoding label of the manifest CSV (shift_jis, euc-jp, utf-8, ...)
# A byte order mark in the file takes precedence.
encoding = "shift_jis"

# The redacted copy is written as <manifest-stem><suffix>.csv
redacted_suffix = "_anonymized"

# ============================================================================
# Executor
# ============================================================================
[executor]
# Only manifest entries ending in .<extension> are processed (case-insensitive)
extension = "mwf"

# Per-file transform deadline in seconds; omit to wait indefinitely
# transform_timeout_secs = 60

# Upper bound on recordings processed at the same time; omit for no limit
# max_concurrency = 8

# Warn when a filename matches several recordings under the search root.
# The first match in lexical walk order is used either way.
report_ambiguous = false

# ============================================================================
# Pseudonym Store
# ============================================================================
[store]
# json_lines: append-only file, one record per line
# memory: records are discarded on exit
backend = "json_lines"
path = "./pseudonyms/pseudonyms.jsonl"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable JSON file logging next to the console output
local_enabled = true

# Log directory and file name (legacy overrides: LOG_FILE_DIR, LOG_FILE_NAME)
local_path = "./logs"
local_file_name = "mwf-deid.log"

# Log rotation (daily, hourly or never)
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeidConfig;
    use tempfile::tempdir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "mwf-deid.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "mwf-deid.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_parse_and_validate() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config: DeidConfig = toml::from_str(&content).unwrap();
            config.validate().unwrap();
            assert_eq!(config.manifest.encoding, "shift_jis");
        }
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mwf-deid.toml");
        std::fs::write(&path, "# existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# existing");
    }
}
