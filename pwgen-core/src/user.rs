//! User generator definitions.
//!
//! A user source is a directory holding one JSON definition per file:
//!
//! ```json
//! { "kind": "characters", "id": "vowels", "name": "Vowels",
//!   "description": "Only vowels", "characters": "aeiou" }
//! { "kind": "words", "id": "fruit", "name": "Fruit", "words": ["apple", "pear"] }
//! { "kind": "markov", "id": "latin", "name": "Latin", "corpus_file": "latin.txt" }
//! ```
//!
//! Relative paths are resolved against the directory of the definition.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::config::{MarkovSettings, Settings};
use crate::error::{PwgenError, Result};
use crate::generator::markov::Corpus;
use crate::generator::words::WordSource;
use crate::generator::{CharsetGenerator, Generator, MarkovGenerator, WordGenerator};
use crate::io::{list_files, read_text};

/// Extension of definition files.
pub const DEFINITION_EXTENSION: &str = "json";

/// One user generator definition, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Definition {
	Characters {
		id: String,
		name: String,
		#[serde(default)]
		description: String,
		characters: String,
	},
	Words {
		id: String,
		name: String,
		#[serde(default)]
		description: String,
		#[serde(default)]
		words: Vec<String>,
		word_file: Option<PathBuf>,
		max_length: Option<usize>,
	},
	Markov {
		id: String,
		name: String,
		#[serde(default)]
		description: String,
		corpus_file: PathBuf,
		entropy: Option<f64>,
		min_length: Option<usize>,
		max_length: Option<usize>,
	},
}

impl Definition {
	pub fn id(&self) -> &str {
		match self {
			Definition::Characters { id, .. } | Definition::Words { id, .. } | Definition::Markov { id, .. } => id,
		}
	}

	fn name(&self) -> &str {
		match self {
			Definition::Characters { name, .. } | Definition::Words { name, .. } | Definition::Markov { name, .. } => {
				name
			}
		}
	}

	/// Reads one definition file.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		serde_json::from_str(&read_text(path)?)
			.map_err(|e| PwgenError::InvalidDefinition { path: path.to_path_buf(), reason: e.to_string() })
	}

	/// Checks the definition and builds its generator.
	///
	/// Only the definition is validated here; the backing data (word file,
	/// corpus) is read lazily by the generator itself.
	///
	/// # Parameters
	/// - `base`: directory relative paths are resolved against.
	/// - `settings`: defaults for optional Markov fields.
	pub fn build(&self, base: &Path, settings: &Settings) -> std::result::Result<Arc<dyn Generator>, String> {
		if self.id().trim().is_empty() {
			return Err("`id` must not be empty".to_owned());
		}
		if self.name().trim().is_empty() {
			return Err("`name` must not be empty".to_owned());
		}

		let resolve = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { base.join(p) };

		let generator: Arc<dyn Generator> = match self {
			Definition::Characters { id, name, description, characters } => {
				Arc::new(CharsetGenerator::new(id, name, description, characters.clone()))
			}
			Definition::Words { id, name, description, words, word_file, max_length } => {
				let source = match (word_file, words.is_empty()) {
					(Some(file), true) => WordSource::File { path: resolve(file.as_path()), max_length: *max_length },
					(None, false) => WordSource::List { words: words.clone(), max_length: *max_length },
					(Some(_), false) => return Err("use either `words` or `word_file`, not both".to_owned()),
					(None, true) => return Err("`words` or `word_file` is required".to_owned()),
				};
				Arc::new(WordGenerator::new(id, name, description, source))
			}
			Definition::Markov { id, name, description, corpus_file, entropy, min_length, max_length } => {
				let markov = MarkovSettings {
					min_length: min_length.unwrap_or(settings.markov.min_length),
					max_length: max_length.unwrap_or(settings.markov.max_length),
					entropy: entropy.unwrap_or(settings.markov.entropy),
				};
				markov.validate()?;
				Arc::new(MarkovGenerator::new(id, name, description, Corpus::File(resolve(corpus_file.as_path())), markov))
			}
		};
		Ok(generator)
	}
}

/// Loads every definition in `dir` and builds its generator.
///
/// Definitions are visited in file-name order. A definition that cannot be
/// read or checked is logged and skipped; it never stops the others.
///
/// # Errors
/// Only if `dir` itself cannot be listed.
pub fn load_dir<P: AsRef<Path>>(dir: P, settings: &Settings) -> Result<Vec<Arc<dyn Generator>>> {
	let dir = dir.as_ref();
	let mut generators = Vec::new();

	for path in list_files(dir, DEFINITION_EXTENSION)? {
		let built = Definition::load(&path).and_then(|definition| {
			definition
				.build(dir, settings)
				.map_err(|reason| PwgenError::InvalidDefinition { path: path.clone(), reason })
		});

		match built {
			Ok(generator) => {
				debug!("Loaded user generator `{}` from `{}`", generator.id(), path.display());
				generators.push(generator);
			}
			Err(e) => error!("Error loading `{}` : {e}", path.display()),
		}
	}

	Ok(generators)
}
