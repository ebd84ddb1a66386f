//! Logging and observability
//!
//! The log stream is the outcome channel of a run: every skipped row, missing
//! file, failed transform and written output is reported here. The structured
//! fields (`filename`, `path`, `output`) let an operator rebuild a pass/fail
//! view from the JSON log file alone.
//!
//! # Example
//!
//! ```no_run
//! use mwf_deid::logging::init_logging;
//! use mwf_deid::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a de-identification run
///
/// # Example
///
/// ```no_run
/// use mwf_deid::log_run_start;
/// use std::path::Path;
///
/// log_run_start!(Path::new("list.csv"), Path::new("/data"), Path::new("/out/2025-01-01-120000"));
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($manifest:expr, $search_root:expr, $output_dir:expr) => {
        tracing::info!(
            manifest = %$manifest.display(),
            search_root = %$search_root.display(),
            output_dir = %$output_dir.display(),
            "Starting de-identification run"
        );
    };
}

/// Log the completion of a de-identification run
///
/// # Example
///
/// ```no_run
/// use mwf_deid::log_run_complete;
/// use mwf_deid::core::executor::RunSummary;
/// use std::time::Duration;
///
/// let summary = RunSummary::default();
/// log_run_complete!(&summary, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($summary:expr, $duration:expr) => {
        tracing::info!(
            written = $summary.written,
            failed = $summary.failed,
            not_found = $summary.not_found,
            skipped = $summary.skipped_extension,
            duration_ms = $duration.as_millis() as u64,
            "De-identification run completed"
        );
    };
}
