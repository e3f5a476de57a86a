//! Entropy-driven password generation library.
//!
//! This crate provides a pluggable password generation system including:
//! - Character-based generators drawing from a fixed alphabet
//! - Word-based generators (word lists, syllables, Markov chains)
//! - Entropy-driven sizing from a strength (bits) or a length target
//! - A registry ranking built-in and user-supplied generators
//!
//! Generation is driven through `session::generate`, or directly through
//! the `Generator` trait for a single generator.

/// Error type shared by every module.
pub mod error;

/// Cryptographically secure randomness used by every generator.
pub mod random;

/// Strength/length conversions and generation targets.
pub mod entropy;

/// The `Generator` trait and its character and word families.
pub mod generator;

/// First-order Markov chain over characters.
///
/// Builds transition counts from a corpus and yields pronounceable words.
pub mod markov;

/// Built-in generator catalog.
pub mod builtin;

/// User-supplied generator definitions (JSON files).
pub mod user;

/// Ranked, deduplicated collection of generators.
pub mod registry;

/// Request/response level generation.
pub mod session;

/// Default values and tunables.
pub mod config;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use error::{PwgenError, Result};
