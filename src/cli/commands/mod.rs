//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod interactive;
pub mod run;
pub mod validate;

use crate::adapters::mfer::MferAnonymizer;
use crate::adapters::store::create_store;
use crate::config::DeidConfig;
use crate::core::executor::RunSummary;
use crate::core::session::{SessionController, SessionReport};
use std::sync::Arc;

/// Environment variable `run` reads the session secret from by default
pub const DEFAULT_SECRET_ENV: &str = "MWF_DEID_SECRET";

/// Wire the configured store and the MFER transform into a controller
pub(crate) fn build_controller(config: &DeidConfig) -> anyhow::Result<SessionController> {
    let store = create_store(&config.store)?;
    let controller = SessionController::new(config, store, Arc::new(MferAnonymizer::new()))?;
    Ok(controller)
}

/// Exit code for a finished run: 0 when clean, 1 when any file was missing or failed
pub(crate) fn exit_code(summary: &RunSummary) -> i32 {
    if summary.is_successful() {
        0
    } else {
        1
    }
}

pub(crate) fn print_report(report: &SessionReport) {
    let summary = &report.summary;

    println!();
    println!("📊 Run Summary");
    println!("  Output directory: {}", report.output_dir.display());
    println!("  Redacted manifest: {}", report.redacted_manifest.display());
    println!("  Manifest rows: {}", report.manifest.target_filenames.len());
    println!("  Empty rows skipped: {}", report.manifest.empty_rows);
    println!("  Pseudonym records stored: {}", report.manifest.records_stored);
    println!("  Recordings written: {}", summary.written);
    println!("  Not a recording: {}", summary.skipped_extension);
    println!("  Not found: {}", summary.not_found);
    println!("  Failed: {}", summary.failed);

    for filename in &summary.missing {
        println!("    ⚠️  missing {filename}");
    }
    for failure in &summary.failures {
        let path = failure
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        println!("    ❌ {path} ({}): {}", failure.stage, failure.message);
    }

    println!();
    if summary.is_successful() {
        println!("✅ Run completed");
    } else {
        println!("⚠️  Run completed with problems, see the log for details");
    }
}
