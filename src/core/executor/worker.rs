//! Per-file worker
//!
//! A worker owns one resolved recording from read to write. Every failure is
//! caught here and turned into a [`FileFailure`], so one bad file never
//! affects its siblings.

use super::summary::{FailureStage, FileFailure};
use crate::adapters::mfer::BinaryTransform;
use crate::domain::TransformError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// One unit of work handed to a worker task
pub(crate) struct FileJob {
    /// Dispatch position, keeps temporary names unique for duplicate entries
    pub index: usize,
    pub source: PathBuf,
    pub output_dir: Arc<PathBuf>,
    pub transform: Arc<dyn BinaryTransform>,
    pub timeout: Option<Duration>,
}

/// What a worker reports back through the join barrier
#[derive(Debug)]
pub(crate) enum FileOutcome {
    Written { output: PathBuf },
    Failed(FileFailure),
}

pub(crate) async fn process_file(job: FileJob) -> FileOutcome {
    let source = job.source.clone();
    match run_job(job).await {
        Ok(output) => {
            tracing::info!(
                path = %source.display(),
                output = %output.display(),
                "Recording anonymized"
            );
            FileOutcome::Written { output }
        }
        Err(failure) => {
            tracing::error!(
                path = %source.display(),
                stage = %failure.stage,
                error = %failure.message,
                "Recording failed"
            );
            FileOutcome::Failed(failure)
        }
    }
}

async fn run_job(job: FileJob) -> Result<PathBuf, FileFailure> {
    let fail = |stage: FailureStage, message: String| FileFailure {
        path: Some(job.source.clone()),
        stage,
        message,
    };

    tracing::debug!(path = %job.source.display(), "Reading recording");
    let data = tokio::fs::read(&job.source)
        .await
        .map_err(|e| fail(FailureStage::Read, e.to_string()))?;

    let anonymized = run_transform(Arc::clone(&job.transform), data, job.timeout)
        .await
        .map_err(|(stage, message)| fail(stage, message))?;

    let file_name = job
        .source
        .file_name()
        .ok_or_else(|| fail(FailureStage::Write, "Source path has no file name".to_string()))?;

    write_output(&job.output_dir, Path::new(file_name), job.index, &anonymized)
        .await
        .map_err(|e| fail(FailureStage::Write, e.to_string()))
}

/// Run the transform on the blocking pool, bounded by `timeout` when set
///
/// A timed-out transform keeps running on its blocking thread; its result is
/// discarded.
async fn run_transform(
    transform: Arc<dyn BinaryTransform>,
    data: Vec<u8>,
    timeout: Option<Duration>,
) -> Result<Vec<u8>, (FailureStage, String)> {
    let name = transform.name();
    let handle = tokio::task::spawn_blocking(move || transform.transform(&data));

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                return Err((
                    FailureStage::Transform,
                    TransformError::TimedOut(limit).to_string(),
                ))
            }
        },
        None => handle.await,
    };

    match joined {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err((FailureStage::Transform, e.to_string())),
        Err(e) => Err((
            FailureStage::Worker,
            format!("Transform '{name}' did not complete: {e}"),
        )),
    }
}

/// Write `bytes` to `<output_dir>/<file_name>`
///
/// The content goes to a hidden temporary file first and is renamed into
/// place, so the output path only ever holds a complete file even when two
/// workers target the same name.
async fn write_output(
    output_dir: &Path,
    file_name: &Path,
    index: usize,
    bytes: &[u8],
) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;

    let output = output_dir.join(file_name);
    let partial = output_dir.join(format!(
        ".{}.{index}.partial",
        file_name.to_string_lossy()
    ));

    if let Err(e) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&partial, &output).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }

    Ok(output)
}
