//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// Password generation errors
#[derive(Debug, Error)]
pub enum PwgenError {
	/// Bad strength/length request. Aborts the whole request.
	#[error("Invalid target: {0}")]
	InvalidTarget(String),

	/// A generator's backing data could not be read.
	#[error("Generator `{id}` is unavailable: {reason}")]
	GeneratorUnavailable { id: String, reason: String },

	/// A generator's alphabet or word list has fewer than two entries.
	#[error("Generator `{id}` has a degenerate alphabet ({size} entries)")]
	DegenerateAlphabet { id: String, size: usize },

	#[error("Generator id `{0}` is already registered")]
	DuplicateGeneratorId(String),

	#[error("Invalid generator definition {}: {reason}", path.display())]
	InvalidDefinition { path: PathBuf, reason: String },

	#[error("Invalid settings: {0}")]
	InvalidSettings(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Chain cache error: {0}")]
	Cache(#[from] postcard::Error),
}

/// Result type for password generation
pub type Result<T> = std::result::Result<T, PwgenError>;
