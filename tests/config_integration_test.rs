//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables hold ENV_MUTEX to avoid
//! interference between tests.

use mwf_deid::config::{load_config, load_config_or_default, StoreBackend};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    for var in [
        "ANNONYMIZED_DATA_DIR",
        "CURRENT_DIR",
        "LOG_FILE_DIR",
        "LOG_FILE_NAME",
        "MWF_DEID_APPLICATION_LOG_LEVEL",
        "MWF_DEID_PATHS_OUTPUT_ROOT",
        "MWF_DEID_EXECUTOR_MAX_CONCURRENCY",
        "MWF_DEID_STORE_BACKEND",
        "TEST_DEID_OUTPUT_ROOT",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[application]
log_level = "debug"

[paths]
output_root = "/srv/ecg/anonymized"
browse_root = "/srv/ecg/incoming"

[manifest]
encoding = "euc-jp"
redacted_suffix = "_deid"

[executor]
extension = "MWF"
transform_timeout_secs = 30
max_concurrency = 4
report_ambiguous = true

[store]
backend = "memory"

[logging]
local_enabled = false
local_path = "/tmp/mwf-deid"
local_file_name = "run.log"
local_rotation = "hourly"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.paths.output_root, PathBuf::from("/srv/ecg/anonymized"));
    assert_eq!(config.paths.browse_root, PathBuf::from("/srv/ecg/incoming"));
    assert_eq!(config.manifest.encoding, "euc-jp");
    assert_eq!(config.manifest.redacted_suffix, "_deid");
    assert_eq!(config.executor.extension, "MWF");
    assert_eq!(config.executor.transform_timeout_secs, Some(30));
    assert_eq!(config.executor.max_concurrency, Some(4));
    assert!(config.executor.report_ambiguous);
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config("[application]\nlog_level = \"warn\"\n");
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.paths.output_root, PathBuf::from("./anonymized"));
    assert_eq!(config.manifest.encoding, "shift_jis");
    assert_eq!(config.manifest.redacted_suffix, "_anonymized");
    assert_eq!(config.executor.extension, "mwf");
    assert_eq!(config.executor.transform_timeout_secs, None);
    assert_eq!(config.executor.max_concurrency, None);
    assert_eq!(config.store.backend, StoreBackend::JsonLines);
    assert!(config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_DEID_OUTPUT_ROOT", "/mnt/share/anonymized");

    let temp_file = write_config("[paths]\noutput_root = \"${TEST_DEID_OUTPUT_ROOT}\"\n");
    let result = load_config(temp_file.path());
    cleanup_env_vars();

    let config = result.expect("Failed to load config");
    assert_eq!(config.paths.output_root, PathBuf::from("/mnt/share/anonymized"));
}

#[test]
fn test_missing_substitution_variable_fails() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config("[paths]\noutput_root = \"${TEST_DEID_OUTPUT_ROOT}\"\n");
    let err = load_config(temp_file.path()).unwrap_err();

    assert!(err.to_string().contains("TEST_DEID_OUTPUT_ROOT"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("MWF_DEID_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("MWF_DEID_EXECUTOR_MAX_CONCURRENCY", "2");
    std::env::set_var("MWF_DEID_STORE_BACKEND", "memory");

    let temp_file = write_config("[application]\nlog_level = \"info\"\n");
    let result = load_config(temp_file.path());
    cleanup_env_vars();

    let config = result.expect("Failed to load config");
    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.executor.max_concurrency, Some(2));
    assert_eq!(config.store.backend, StoreBackend::Memory);
}

#[test]
fn test_legacy_env_vars_apply_and_prefixed_vars_win() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("ANNONYMIZED_DATA_DIR", "/legacy/out");
    std::env::set_var("CURRENT_DIR", "/legacy/in");
    std::env::set_var("LOG_FILE_NAME", "legacy.log");

    let temp_file = write_config("");
    let legacy = load_config(temp_file.path());

    std::env::set_var("MWF_DEID_PATHS_OUTPUT_ROOT", "/preferred/out");
    let preferred = load_config(temp_file.path());
    cleanup_env_vars();

    let legacy = legacy.expect("Failed to load config");
    assert_eq!(legacy.paths.output_root, PathBuf::from("/legacy/out"));
    assert_eq!(legacy.paths.browse_root, PathBuf::from("/legacy/in"));
    assert_eq!(legacy.logging.local_file_name, "legacy.log");

    let preferred = preferred.expect("Failed to load config");
    assert_eq!(preferred.paths.output_root, PathBuf::from("/preferred/out"));
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    for content in [
        "[application]\nlog_level = \"loud\"\n",
        "[manifest]\nencoding = \"not-an-encoding\"\n",
        "[executor]\nmax_concurrency = 0\n",
        "[executor]\nextension = \".mwf\"\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
    ] {
        let temp_file = write_config(content);
        let err = load_config(temp_file.path()).unwrap_err();
        assert!(
            err.to_string().contains("validation failed"),
            "expected validation error for {content:?}, got {err}"
        );
    }
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(load_config(&path).is_err());
    let config = load_config_or_default(&path).expect("defaults should validate");
    assert_eq!(config.executor.extension, "mwf");
}
