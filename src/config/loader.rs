//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DeidConfig, StoreBackend};
use crate::domain::errors::DeidError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into DeidConfig
/// 4. Applies environment variable overrides (legacy names, then MWF_DEID_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use mwf_deid::config::loader::load_config;
///
/// let config = load_config("mwf-deid.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DeidConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DeidError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DeidError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: DeidConfig = toml::from_str(&contents)
        .map_err(|e| DeidError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(&mut config)?;
    Ok(config)
}

/// Loads configuration from a TOML file, falling back to defaults when it is absent
///
/// Environment overrides and validation still apply to the defaults, so a
/// deployment driven purely by `.env` keeps working without a config file.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<DeidConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(
        path = %path.display(),
        "Configuration file not found, using defaults"
    );
    let mut config = DeidConfig::default();
    finish(&mut config)?;
    Ok(config)
}

fn finish(config: &mut DeidConfig) -> Result<()> {
    apply_env_overrides(config);

    config.validate().map_err(|e| {
        DeidError::Configuration(format!("Configuration validation failed: {}", e))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| DeidError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        // Comments are left untouched
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DeidError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides
///
/// The legacy deployment variables (`ANNONYMIZED_DATA_DIR`, `CURRENT_DIR`,
/// `LOG_FILE_DIR`, `LOG_FILE_NAME`) are read first so existing `.env` files keep
/// working. Variables following the `MWF_DEID_<SECTION>_<KEY>` pattern are read
/// afterwards and take precedence.
fn apply_env_overrides(config: &mut DeidConfig) {
    // Legacy names
    if let Ok(val) = std::env::var("ANNONYMIZED_DATA_DIR") {
        config.paths.output_root = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("CURRENT_DIR") {
        config.paths.browse_root = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("LOG_FILE_DIR") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("LOG_FILE_NAME") {
        config.logging.local_file_name = val;
    }

    // Application overrides
    if let Ok(val) = std::env::var("MWF_DEID_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Path overrides
    if let Ok(val) = std::env::var("MWF_DEID_PATHS_OUTPUT_ROOT") {
        config.paths.output_root = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("MWF_DEID_PATHS_BROWSE_ROOT") {
        config.paths.browse_root = PathBuf::from(val);
    }

    // Manifest overrides
    if let Ok(val) = std::env::var("MWF_DEID_MANIFEST_ENCODING") {
        config.manifest.encoding = val;
    }

    // Executor overrides
    if let Ok(val) = std::env::var("MWF_DEID_EXECUTOR_EXTENSION") {
        config.executor.extension = val;
    }
    if let Ok(val) = std::env::var("MWF_DEID_EXECUTOR_TRANSFORM_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse() {
            config.executor.transform_timeout_secs = Some(secs);
        }
    }
    if let Ok(val) = std::env::var("MWF_DEID_EXECUTOR_MAX_CONCURRENCY") {
        if let Ok(limit) = val.parse() {
            config.executor.max_concurrency = Some(limit);
        }
    }
    if let Ok(val) = std::env::var("MWF_DEID_EXECUTOR_REPORT_AMBIGUOUS") {
        config.executor.report_ambiguous = val.parse().unwrap_or(false);
    }

    // Store overrides
    if let Ok(val) = std::env::var("MWF_DEID_STORE_BACKEND") {
        match val.as_str() {
            "json_lines" => config.store.backend = StoreBackend::JsonLines,
            "memory" => config.store.backend = StoreBackend::Memory,
            other => tracing::warn!(value = %other, "Ignoring unknown MWF_DEID_STORE_BACKEND"),
        }
    }
    if let Ok(val) = std::env::var("MWF_DEID_STORE_PATH") {
        config.store.path = PathBuf::from(val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("MWF_DEID_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("MWF_DEID_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("MWF_DEID_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }
}
