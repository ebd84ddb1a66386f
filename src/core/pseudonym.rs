//! Keyed pseudonymization of patient identifiers
//!
//! A token is the lowercase hex SHA-256 of the identifier bytes followed by the
//! secret bytes. There is no per-run salt: the same secret always maps the same
//! patient to the same token, which is what lets the pseudonym store link a
//! patient across separate manifests.

use crate::config::SecretString;
use crate::domain::PseudonymToken;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

/// Hash `identifier || secret` into a pseudonym token
///
/// Pure and infallible. Empty identifiers or secrets are hashed as given.
///
/// # Examples
///
/// ```
/// use mwf_deid::core::pseudonym::pseudonymize;
///
/// let a = pseudonymize("PID123", "s");
/// let b = pseudonymize("PID123", "s");
/// assert_eq!(a, b);
/// assert_ne!(a, pseudonymize("PID123", "other"));
/// ```
pub fn pseudonymize(identifier: &str, secret: &str) -> PseudonymToken {
    digest_token(identifier.as_bytes(), secret.as_bytes())
}

fn digest_token(identifier: &[u8], secret: &[u8]) -> PseudonymToken {
    let mut hasher = Sha256::new();
    hasher.update(identifier);
    hasher.update(secret);
    PseudonymToken::from_digest_hex(format!("{:x}", hasher.finalize()))
}

/// Pseudonymizer bound to one session's secret
///
/// Holds the secret in a [`SecretString`] so it is zeroed on drop and never
/// appears in `Debug` output.
#[derive(Debug, Clone)]
pub struct Pseudonymizer {
    secret: SecretString,
}

impl Pseudonymizer {
    /// Create a pseudonymizer for the given secret
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Token for `identifier` under this pseudonymizer's secret
    pub fn token_for(&self, identifier: &str) -> PseudonymToken {
        digest_token(identifier.as_bytes(), self.secret.expose_secret().as_bytes())
    }
}
