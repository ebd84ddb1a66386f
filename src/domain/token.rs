//! Pseudonym token newtype

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a token in hex characters (SHA-256 digest)
pub const TOKEN_HEX_LEN: usize = 64;

/// Opaque pseudonym that replaces a raw patient identifier
///
/// Always 64 lowercase hexadecimal characters.
///
/// # Examples
///
/// ```
/// use mwf_deid::domain::PseudonymToken;
/// use std::str::FromStr;
///
/// let hex = "a".repeat(64);
/// let token = PseudonymToken::from_str(&hex).unwrap();
/// assert_eq!(token.as_str(), hex);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PseudonymToken(String);

impl PseudonymToken {
    /// Creates a token from an already hex-encoded digest
    pub fn new(hex: impl Into<String>) -> Result<Self, String> {
        let hex = hex.into();
        if hex.len() != TOKEN_HEX_LEN {
            return Err(format!(
                "Pseudonym token must be {TOKEN_HEX_LEN} hex characters, got {}",
                hex.len()
            ));
        }
        if !hex
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err("Pseudonym token must be lowercase hexadecimal".to_string());
        }
        Ok(Self(hex))
    }

    /// Wraps the `{:x}` rendering of a SHA-256 digest
    pub(crate) fn from_digest_hex(hex: String) -> Self {
        debug_assert_eq!(hex.len(), TOKEN_HEX_LEN);
        Self(hex)
    }

    /// Returns the token as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PseudonymToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PseudonymToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PseudonymToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
