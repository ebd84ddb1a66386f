//! Domain error types
//!
//! This module defines the error hierarchy for mwf-deid. Errors are split along
//! the lines of the pipeline stages so callers can tell a fatal-to-run failure
//! (manifest, output directory, store) from a per-file one (transform).
//! Third-party error types are converted to strings at the boundary.

use thiserror::Error;

/// Main mwf-deid error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum DeidError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Manifest ingestion errors (fatal to the current run)
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Pseudonym store errors
    #[error("Pseudonym store error: {0}")]
    Store(String),

    /// Binary transform errors
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Session setup errors (missing inputs, uncreatable output directory)
    #[error("Session error: {0}")]
    Session(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Manifest-specific errors
///
/// A corrupt manifest cannot be partially trusted, so every variant here
/// aborts the run.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read
    #[error("Failed to read manifest {path}: {message}")]
    Unreadable { path: String, message: String },

    /// The manifest bytes are not valid in the configured encoding
    #[error("Manifest {path} is not valid {encoding}")]
    Decode { path: String, encoding: String },

    /// Unknown encoding label in configuration
    #[error("Unsupported manifest encoding: {0}")]
    UnsupportedEncoding(String),

    /// CSV framing error (unbalanced quotes, inconsistent column counts)
    #[error("Malformed CSV in manifest: {0}")]
    MalformedCsv(String),

    /// Failed to write the redacted manifest
    #[error("Failed to write redacted manifest {path}: {message}")]
    WriteFailed { path: String, message: String },
}

/// Binary transform errors
///
/// Returned by a [`BinaryTransform`](crate::adapters::mfer::BinaryTransform)
/// for malformed or unsupported input. No partial output accompanies an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Input is empty
    #[error("Input is empty")]
    EmptyInput,

    /// Input ended inside a tag header or value
    #[error("Truncated input at offset {offset}: {context}")]
    Truncated { offset: usize, context: &'static str },

    /// Length field uses an unsupported encoding
    #[error("Invalid length encoding at offset {offset}: {detail}")]
    InvalidLength { offset: usize, detail: String },

    /// Transform did not finish within the configured deadline
    #[error("Transform timed out after {0:?}")]
    TimedOut(std::time::Duration),
}

// Conversion from std::io::Error
impl From<std::io::Error> for DeidError {
    fn from(err: std::io::Error) -> Self {
        DeidError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DeidError {
    fn from(err: serde_json::Error) -> Self {
        DeidError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DeidError {
    fn from(err: toml::de::Error) -> Self {
        DeidError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for ManifestError {
    fn from(err: csv::Error) -> Self {
        ManifestError::MalformedCsv(err.to_string())
    }
}
