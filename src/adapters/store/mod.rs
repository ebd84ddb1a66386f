//! Pseudonym store adapters
//!
//! - [`traits`] - the [`PseudonymStore`] insert contract
//! - [`jsonl`] - append-only JSON-lines file backend
//! - [`memory`] - in-process backend for tests and throwaway runs

pub mod jsonl;
pub mod memory;
pub mod traits;

pub use jsonl::JsonLinesStore;
pub use memory::InMemoryStore;
pub use traits::PseudonymStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::domain::Result;
use std::sync::Arc;

/// Create a pseudonym store based on the configuration
///
/// # Errors
///
/// Returns an error if the backend cannot be initialised
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn PseudonymStore>> {
    match config.backend {
        StoreBackend::JsonLines => {
            tracing::debug!(path = %config.path.display(), "Opening JSON-lines pseudonym store");
            Ok(Arc::new(JsonLinesStore::open(&config.path)?))
        }
        StoreBackend::Memory => {
            tracing::warn!("Pseudonym records are kept in memory only and will be lost on exit");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
