//! Pseudonym store abstraction
//!
//! The pipeline only ever appends to the store. Lookup for re-identification
//! is an operator concern and not part of this trait.

use crate::domain::{PseudonymRecord, Result};
use async_trait::async_trait;

/// Persistence for token to original-row mappings
///
/// Implementations must make a record durable (or at least visible to later
/// readers) before `insert` returns, because the manifest processor only emits
/// a token into the redacted manifest after its record has been stored.
#[async_trait]
pub trait PseudonymStore: Send + Sync {
    /// Append one record
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted. The caller treats
    /// this as fatal to the run.
    async fn insert(&self, record: PseudonymRecord) -> Result<()>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
