// mwf-deid - MFER ECG de-identification tool
// Copyright (c) 2025 mwf-deid Contributors
// Licensed under the MIT License

//! # mwf-deid - MFER ECG de-identification
//!
//! Prepares MFER (`.mwf`) electrocardiogram recordings for secondary use. A
//! run takes a CSV manifest listing recordings and their patients, replaces
//! every patient identifier with a keyed pseudonym and writes anonymized
//! copies of the listed recordings into a fresh, timestamped directory.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and interactive session loop
//! - [`core`] - Pseudonymization, manifest processing, resolution, execution
//! - [`adapters`] - Binary transform and pseudonym store implementations
//! - [`domain`] - Domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Pseudonyms
//!
//! A pseudonym is the hex SHA-256 of the patient identifier followed by the
//! session secret. The same secret always yields the same token, so records
//! from separate manifests can be linked without storing raw identifiers in
//! the output:
//!
//! ```rust
//! use mwf_deid::core::pseudonym::pseudonymize;
//!
//! let token = pseudonymize("PID123", "s");
//! assert_eq!(token.as_str().len(), 64);
//! assert_eq!(token, pseudonymize("PID123", "s"));
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], backed by [`domain::DeidError`].
//! Manifest problems abort a run; problems with a single recording are logged
//! and counted in the [`core::executor::RunSummary`] while the other files
//! continue.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
