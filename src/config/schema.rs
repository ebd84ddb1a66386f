//! Configuration schema types
//!
//! This module defines the configuration structure for mwf-deid. Every section
//! has defaults, so a configuration file only needs the values that differ.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main mwf-deid configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeidConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Manifest decoding settings
    #[serde(default)]
    pub manifest: ManifestConfig,

    /// Anonymization executor settings
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Pseudonym store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DeidConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.paths.validate()?;
        self.manifest.validate()?;
        self.executor.validate()?;
        self.store.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Input and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root under which every run gets its own timestamped directory
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Directory the interactive session starts browsing from
    #[serde(default = "default_browse_root")]
    pub browse_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            browse_root: default_browse_root(),
        }
    }
}

impl PathsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_root.as_os_str().is_empty() {
            return Err("paths.output_root cannot be empty".to_string());
        }
        if self.browse_root.as_os_str().is_empty() {
            return Err("paths.browse_root cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Manifest decoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// WHATWG encoding label of the manifest bytes (e.g. "shift_jis", "euc-jp", "utf-8")
    #[serde(default = "default_manifest_encoding")]
    pub encoding: String,

    /// Suffix appended to the manifest basename for the redacted copy
    #[serde(default = "default_redacted_suffix")]
    pub redacted_suffix: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            encoding: default_manifest_encoding(),
            redacted_suffix: default_redacted_suffix(),
        }
    }
}

impl ManifestConfig {
    fn validate(&self) -> Result<(), String> {
        if encoding_rs::Encoding::for_label(self.encoding.as_bytes()).is_none() {
            return Err(format!(
                "Invalid manifest.encoding '{}'. Must be a WHATWG encoding label such as shift_jis",
                self.encoding
            ));
        }
        if self.redacted_suffix.is_empty() {
            return Err("manifest.redacted_suffix cannot be empty".to_string());
        }
        if self.redacted_suffix.contains(['/', '\\']) {
            return Err("manifest.redacted_suffix cannot contain path separators".to_string());
        }
        Ok(())
    }
}

/// Anonymization executor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Recording file extension eligible for the transform, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Deadline for a single transform call; unset waits indefinitely
    #[serde(default)]
    pub transform_timeout_secs: Option<u64>,

    /// Upper bound on simultaneously running workers; unset runs every file at once
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Log a warning when a filename matches more than one file under the search root
    #[serde(default)]
    pub report_ambiguous: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            transform_timeout_secs: None,
            max_concurrency: None,
            report_ambiguous: false,
        }
    }
}

impl ExecutorConfig {
    fn validate(&self) -> Result<(), String> {
        if self.extension.is_empty() {
            return Err("executor.extension cannot be empty".to_string());
        }
        if self.extension.contains('.') {
            return Err(format!(
                "executor.extension '{}' must not contain a dot",
                self.extension
            ));
        }
        if self.transform_timeout_secs == Some(0) {
            return Err("executor.transform_timeout_secs must be > 0".to_string());
        }
        if self.max_concurrency == Some(0) {
            return Err("executor.max_concurrency must be > 0".to_string());
        }
        Ok(())
    }
}

/// Pseudonym store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Append-only JSON-lines file
    #[default]
    JsonLines,
    /// Process memory only (records are lost on exit)
    Memory,
}

/// Pseudonym store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend to persist pseudonym records with
    #[serde(default)]
    pub backend: StoreBackend,

    /// File used by the json_lines backend
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backend == StoreBackend::JsonLines && self.path.as_os_str().is_empty() {
            return Err("store.path is required when store.backend = 'json_lines'".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log file name (rotated files get a date suffix)
    #[serde(default = "default_local_file_name")]
    pub local_file_name: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_file_name: default_local_file_name(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_file_name.is_empty() {
            return Err("logging.local_file_name cannot be empty".to_string());
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_output_root() -> PathBuf {
    PathBuf::from("./anonymized")
}

fn default_browse_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_manifest_encoding() -> String {
    "shift_jis".to_string()
}

fn default_redacted_suffix() -> String {
    "_anonymized".to_string()
}

fn default_extension() -> String {
    "mwf".to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./pseudonyms/pseudonyms.jsonl")
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_file_name() -> String {
    "mwf-deid.log".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
