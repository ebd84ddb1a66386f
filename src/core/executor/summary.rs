//! Run summary
//!
//! The log stream is the primary record of a run. [`RunSummary`] aggregates
//! the same per-file outcomes so callers can decide on an exit code without
//! parsing logs.

use std::path::PathBuf;

/// Pipeline stage at which a file failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Reading the source recording
    Read,
    /// Running the binary transform
    Transform,
    /// Creating the output directory or writing the output file
    Write,
    /// The worker task panicked or was aborted
    Worker,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureStage::Read => "read",
            FailureStage::Transform => "transform",
            FailureStage::Write => "write",
            FailureStage::Worker => "worker",
        };
        write!(f, "{s}")
    }
}

/// One failed file
#[derive(Debug, Clone)]
pub struct FileFailure {
    /// Source path, when known
    pub path: Option<PathBuf>,

    /// Where it failed
    pub stage: FailureStage,

    /// Error message
    pub message: String,
}

/// Aggregated outcome of one executor run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Manifest entries considered
    pub total_targets: usize,

    /// Entries skipped because they do not carry the recording extension
    pub skipped_extension: usize,

    /// Entries with no matching file under the search root
    pub not_found: usize,

    /// Files successfully transformed and written
    pub written: usize,

    /// Files dispatched to a worker that did not produce output
    pub failed: usize,

    /// Output files written, in completion order
    pub written_files: Vec<PathBuf>,

    /// Filenames that could not be resolved
    pub missing: Vec<String>,

    /// Details of every failure
    pub failures: Vec<FileFailure>,
}

impl RunSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files handed to workers
    pub fn dispatched(&self) -> usize {
        self.written + self.failed
    }

    /// True when every dispatched file was written and nothing was missing
    pub fn is_successful(&self) -> bool {
        self.failed == 0 && self.not_found == 0
    }

    pub(crate) fn add_written(&mut self, output: PathBuf) {
        self.written += 1;
        self.written_files.push(output);
    }

    pub(crate) fn add_failure(&mut self, failure: FileFailure) {
        self.failed += 1;
        self.failures.push(failure);
    }

    pub(crate) fn add_missing(&mut self, filename: &str) {
        self.not_found += 1;
        self.missing.push(filename.to_string());
    }
}
