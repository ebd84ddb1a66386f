//! Anonymization executor
//!
//! Takes the target filenames produced by the manifest phase, resolves each
//! one under the search root and runs the binary transform on every resolved
//! file concurrently. [`AnonymizationExecutor::run`] returns only after every
//! dispatched worker has finished.
//!
//! Per-file problems (wrong extension, not found, read, transform or write
//! failures) are logged and counted; they never stop the remaining files.

pub mod summary;
mod worker;

pub use summary::{FailureStage, FileFailure, RunSummary};

use crate::adapters::mfer::BinaryTransform;
use crate::config::ExecutorConfig;
use crate::core::resolver;
use crate::domain::{DeidError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use worker::{FileJob, FileOutcome};

/// Create `path` and any missing parents
///
/// Idempotent and safe to call from many workers at once.
///
/// # Errors
///
/// Returns [`DeidError::Session`] if the directory cannot be created.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| {
        DeidError::Session(format!(
            "Failed to create output directory {}: {e}",
            path.display()
        ))
    })
}

/// True when `filename` ends with `.<extension>`, ignoring ASCII case
pub fn has_recording_extension(filename: &str, extension: &str) -> bool {
    let suffix = format!(".{}", extension.to_ascii_lowercase());
    filename.to_ascii_lowercase().ends_with(&suffix)
}

/// Runs a [`BinaryTransform`] over every resolvable manifest entry
pub struct AnonymizationExecutor {
    transform: Arc<dyn BinaryTransform>,
    extension: String,
    timeout: Option<Duration>,
    max_concurrency: Option<usize>,
    report_ambiguous: bool,
}

impl AnonymizationExecutor {
    /// Create an executor from the `[executor]` configuration section
    pub fn new(transform: Arc<dyn BinaryTransform>, config: &ExecutorConfig) -> Self {
        Self {
            transform,
            extension: config.extension.clone(),
            timeout: config.transform_timeout_secs.map(Duration::from_secs),
            max_concurrency: config.max_concurrency,
            report_ambiguous: config.report_ambiguous,
        }
    }

    /// Override the per-file transform deadline
    pub fn with_transform_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Process every target and wait for all workers to finish
    ///
    /// Entries are handled in manifest order: extension check, resolution,
    /// then dispatch. Output files are named after the source basename inside
    /// `output_dir`.
    pub async fn run(
        &self,
        target_filenames: &[String],
        search_root: &Path,
        output_dir: &Path,
    ) -> RunSummary {
        let mut summary = RunSummary {
            total_targets: target_filenames.len(),
            ..RunSummary::default()
        };

        tracing::info!(
            targets = target_filenames.len(),
            transform = self.transform.name(),
            max_concurrency = ?self.max_concurrency,
            "Dispatching recordings"
        );

        let semaphore = self
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit)));
        let output_dir = Arc::new(output_dir.to_path_buf());
        let mut workers = JoinSet::new();

        for (index, filename) in target_filenames.iter().enumerate() {
            if !has_recording_extension(filename, &self.extension) {
                tracing::debug!(filename = %filename, "Skipping entry without recording extension");
                summary.skipped_extension += 1;
                continue;
            }

            let resolved = resolve_off_runtime(search_root, filename, self.report_ambiguous).await;
            let source = match resolved {
                Ok(Some(source)) => source,
                Ok(None) => {
                    tracing::warn!(
                        filename = %filename,
                        search_root = %search_root.display(),
                        "Recording not found"
                    );
                    summary.add_missing(filename);
                    continue;
                }
                Err(e) => {
                    tracing::error!(filename = %filename, error = %e, "Recording lookup did not complete");
                    summary.add_failure(FileFailure {
                        path: None,
                        stage: FailureStage::Worker,
                        message: format!("{filename}: {e}"),
                    });
                    continue;
                }
            };

            tracing::debug!(filename = %filename, path = %source.display(), "Resolved recording");

            let job = FileJob {
                index,
                source,
                output_dir: Arc::clone(&output_dir),
                transform: Arc::clone(&self.transform),
                timeout: self.timeout,
            };
            let limiter = semaphore.clone();

            workers.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                worker::process_file(job).await
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(FileOutcome::Written { output }) => summary.add_written(output),
                Ok(FileOutcome::Failed(failure)) => summary.add_failure(failure),
                Err(e) => {
                    tracing::error!(error = %e, "Worker task did not complete");
                    summary.add_failure(FileFailure {
                        path: None,
                        stage: FailureStage::Worker,
                        message: e.to_string(),
                    });
                }
            }
        }

        summary
    }
}

/// Walk the search root on the blocking pool so dispatched workers keep
/// running on the runtime threads
async fn resolve_off_runtime(
    search_root: &Path,
    filename: &str,
    report_ambiguous: bool,
) -> std::result::Result<Option<PathBuf>, tokio::task::JoinError> {
    let search_root = search_root.to_path_buf();
    let filename = filename.to_string();
    tokio::task::spawn_blocking(move || resolve(&search_root, &filename, report_ambiguous)).await
}

fn resolve(search_root: &Path, filename: &str, report_ambiguous: bool) -> Option<PathBuf> {
    if !report_ambiguous {
        return resolver::find(search_root, filename);
    }

    let matches = resolver::find_all(search_root, filename);
    if matches.len() > 1 {
        tracing::warn!(
            filename = %filename,
            matches = matches.len(),
            chosen = %matches[0].display(),
            "Filename matches more than one recording; using the first"
        );
    }
    matches.into_iter().next()
}
