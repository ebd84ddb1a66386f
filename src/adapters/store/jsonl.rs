//! JSON-lines pseudonym store
//!
//! Each record is one JSON object per line:
//!
//! ```text
//! {"token":"9f86d0...","original_row":["rec1.mwf","X","PID123"],"created_at":"2025-01-01T12:00:00Z"}
//! ```
//!
//! The file is append-only. It contains raw patient identifiers and must be
//! protected like any other re-identification key.

use super::traits::PseudonymStore;
use crate::domain::{DeidError, PseudonymRecord, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Append-only JSON-lines file store
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesStore {
    /// Open (or prepare to create) a store at `path`
    ///
    /// The parent directory is created if missing; the file itself is created
    /// on first insert.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DeidError::Store(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back from a store file
    ///
    /// Used for audits; the pipeline itself never reads the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not a valid record.
    pub async fn read_records(path: impl AsRef<Path>) -> Result<Vec<PseudonymRecord>> {
        let path = path.as_ref();
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DeidError::Store(format!(
                    "Failed to read store {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(DeidError::from))
            .collect()
    }
}

#[async_trait]
impl PseudonymStore for JsonLinesStore {
    async fn insert(&self, record: PseudonymRecord) -> Result<()> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                DeidError::Store(format!(
                    "Failed to open store {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| DeidError::Store(format!("Failed to append record: {e}")))?;
        file.sync_data()
            .await
            .map_err(|e| DeidError::Store(format!("Failed to sync store: {e}")))?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "json_lines"
    }
}
