//! In-memory pseudonym store

use super::traits::PseudonymStore;
use crate::domain::{PseudonymRecord, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Store that keeps records in process memory
///
/// Records are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<PseudonymRecord>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record inserted so far, in insertion order
    pub async fn records(&self) -> Vec<PseudonymRecord> {
        self.records.lock().await.clone()
    }

    /// Number of records inserted so far
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether nothing has been inserted yet
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl PseudonymStore for InMemoryStore {
    async fn insert(&self, record: PseudonymRecord) -> Result<()> {
        self.records.lock().await.push(record);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
