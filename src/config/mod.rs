//! Configuration management for mwf-deid.
//!
//! # Overview
//!
//! mwf-deid uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `MWF_DEID_*` environment overrides, plus the legacy `ANNONYMIZED_DATA_DIR`,
//!   `CURRENT_DIR`, `LOG_FILE_DIR` and `LOG_FILE_NAME` variables
//! - Default values for every setting
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [paths]
//! output_root = "/data/anonymized"
//! browse_root = "/data/incoming"
//!
//! [manifest]
//! encoding = "shift_jis"
//!
//! [executor]
//! extension = "mwf"
//!
//! [store]
//! backend = "json_lines"
//! path = "/data/pseudonyms/pseudonyms.jsonl"
//! ```
//!
//! The pseudonymization key is not part of the configuration; it
//! is entered per session and kept in a [`SecretString`].

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, DeidConfig, ExecutorConfig, LoggingConfig, ManifestConfig, PathsConfig,
    StoreBackend, StoreConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
