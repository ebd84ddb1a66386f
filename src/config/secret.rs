//! Secure handling of the session secret using the secrecy crate
//!
//! The pseudonymization key is typed in by the operator at the start of every
//! session. It lives only in memory, is zeroed when the session is dropped and
//! never shows up in `Debug` output or logs.
//!
//! # Example
//!
//! ```rust
//! use mwf_deid::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("hospital-key".to_string());
//! assert_eq!(key.expose_secret().as_ref(), "hospital-key");
//!
//! // Debug output is redacted
//! assert!(!format!("{key:?}").contains("hospital-key"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw bytes of the secret, for hashing
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Type alias for a secret string
///
/// This wraps a `SecretValue` in a `Secret` container that:
/// - Zeros the memory when dropped
/// - Prevents accidental logging via Debug
/// - Requires explicit `expose_secret()` to access
pub type SecretString = Secret<SecretValue>;

/// Helper function to create a SecretString from a String
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}
