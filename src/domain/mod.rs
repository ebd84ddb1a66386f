//! Domain models and types for mwf-deid.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed tokens** ([`PseudonymToken`])
//! - **Manifest models** ([`ManifestRow`], [`RedactedRow`], [`PseudonymRecord`])
//! - **Error types** ([`DeidError`], [`ManifestError`], [`TransformError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, DeidError>`]:
//!
//! ```rust
//! use mwf_deid::domain::{DeidError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(DeidError::Validation("manifest path is empty".to_string()))
//! }
//! ```

pub mod errors;
pub mod manifest;
pub mod result;
pub mod token;

// Re-export commonly used types for convenience
pub use errors::{DeidError, ManifestError, TransformError};
pub use manifest::{ManifestRow, PseudonymRecord, RedactedRow};
pub use result::Result;
pub use token::PseudonymToken;
