//! Binary recording transforms
//!
//! The executor only knows the [`BinaryTransform`] contract: bytes in, bytes
//! out, or an error with no partial output. [`MferAnonymizer`] is the
//! implementation for MFER (`.mwf`) waveform files.

pub mod anonymizer;
pub mod tags;

pub use anonymizer::MferAnonymizer;

use crate::domain::TransformError;

/// Strips personal data from a recording's binary content
///
/// Implementations must be deterministic for identical input, must not keep
/// state between calls and must return an error instead of partial output for
/// malformed or unsupported input.
pub trait BinaryTransform: Send + Sync {
    /// Produce the anonymized copy of `input`
    ///
    /// # Errors
    ///
    /// Returns a [`TransformError`] when the input is malformed or unsupported.
    fn transform(&self, input: &[u8]) -> Result<Vec<u8>, TransformError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}
