//! Core de-identification logic
//!
//! # Modules
//!
//! - [`pseudonym`] - keyed SHA-256 pseudonym tokens
//! - [`manifest`] - manifest decoding, pseudonymization and redaction
//! - [`resolver`] - recursive lookup of recordings by basename
//! - [`executor`] - concurrent transform of resolved recordings with a join barrier
//! - [`session`] - one run from secret to output directory
//!
//! # Run Workflow
//!
//! 1. **Open session**: check inputs, pick a timestamped run directory
//! 2. **Manifest phase**: decode the manifest, store one pseudonym record per
//!    patient row, write the redacted manifest
//! 3. **Executor phase**: resolve every target filename and transform the
//!    recordings concurrently
//! 4. **Join**: wait for every worker, then report
//!
//! # Example
//!
//! ```rust,no_run
//! use mwf_deid::adapters::mfer::MferAnonymizer;
//! use mwf_deid::adapters::store::create_store;
//! use mwf_deid::config::{load_config_or_default, secret_string};
//! use mwf_deid::core::session::SessionController;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default("mwf-deid.toml")?;
//! let store = create_store(&config.store)?;
//! let controller = SessionController::new(&config, store, Arc::new(MferAnonymizer::new()))?;
//!
//! let mut session = controller.begin(
//!     secret_string("hospital-secret".to_string()),
//!     "list.csv",
//!     "/data/ecg",
//! )?;
//! let report = controller.run(&mut session).await?;
//!
//! println!("Written: {}", report.summary.written);
//! println!("Failed: {}", report.summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod executor;
pub mod manifest;
pub mod pseudonym;
pub mod resolver;
pub mod session;
