//! Manifest row and pseudonym record models
//!
//! A manifest row is the ordered list of fields from one CSV line. Column 0 is
//! the recording filename and column 2, when present, the raw patient
//! identifier. Only the first three columns survive redaction.

use super::token::PseudonymToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column index of the recording filename
pub const FILENAME_COLUMN: usize = 0;

/// Column index of the raw patient identifier
pub const PATIENT_ID_COLUMN: usize = 2;

/// Number of leading columns kept in a redacted row
pub const REDACTED_COLUMNS: usize = 3;

/// One decoded manifest line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow(Vec<String>);

impl ManifestRow {
    /// Creates a row from its fields
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Returns all fields
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// Number of fields in the row
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Target recording filename (column 0)
    pub fn filename(&self) -> Option<&str> {
        self.0.get(FILENAME_COLUMN).map(String::as_str)
    }

    /// Raw patient identifier (column 2), if the row carries one
    pub fn patient_id(&self) -> Option<&str> {
        self.0.get(PATIENT_ID_COLUMN).map(String::as_str)
    }

    /// Builds the redacted form of this row
    ///
    /// Keeps at most the first three fields and, when a token is given and the
    /// row has a patient identifier column, replaces that column with the token.
    pub fn redact(&self, token: Option<&PseudonymToken>) -> RedactedRow {
        let mut fields: Vec<String> = self.0.iter().take(REDACTED_COLUMNS).cloned().collect();
        if let (Some(token), Some(slot)) = (token, fields.get_mut(PATIENT_ID_COLUMN)) {
            *slot = token.as_str().to_string();
        }
        RedactedRow(fields)
    }

    /// Consumes self and returns the fields
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for ManifestRow {
    fn from(fields: Vec<String>) -> Self {
        Self::new(fields)
    }
}

/// Manifest row with the patient identifier replaced by its token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedRow(Vec<String>);

impl RedactedRow {
    /// Returns all fields
    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

/// Token to original-row mapping kept for re-identification audits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PseudonymRecord {
    /// Token that replaced the patient identifier
    pub token: PseudonymToken,

    /// The complete original manifest row, all columns included
    pub original_row: Vec<String>,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl PseudonymRecord {
    /// Creates a record stamped with the current time
    pub fn new(token: PseudonymToken, original_row: &ManifestRow) -> Self {
        Self {
            token,
            original_row: original_row.fields().to_vec(),
            created_at: Utc::now(),
        }
    }
}
