//! Collaborators behind trait seams
//!
//! - [`mfer`] - [`BinaryTransform`](mfer::BinaryTransform) and the MFER
//!   waveform anonymizer
//! - [`store`] - [`PseudonymStore`](store::PseudonymStore) and its backends
//!
//! The core only depends on the traits, so tests swap in stub transforms and
//! the in-memory store.

pub mod mfer;
pub mod store;
