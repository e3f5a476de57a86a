use std::path::PathBuf;

use once_cell::sync::OnceCell;

use super::{Generator, Password, join_words};
use crate::config::MarkovSettings;
use crate::entropy::Target;
use crate::error::{PwgenError, Result};
use crate::markov::{MarkovChain, PronounceableWords};
use crate::random::RandomSource;

/// Corpus a `MarkovGenerator` learns from.
#[derive(Debug, Clone)]
pub enum Corpus {
	/// Text compiled into the binary.
	Embedded(&'static str),
	/// Text file on disk. The built chain is cached next to it.
	File(PathBuf),
}

/// Generates pronounceable passwords from words walked on a Markov chain.
///
/// The chain is built on first use and shared read-only by every password
/// generated afterwards.
///
/// # Entropy
/// The entropy of a word walked from a chain depends on the corpus statistics
/// and is not computed. `MarkovSettings::entropy` is used instead: a
/// conservative per-word estimate, not a measured value.
#[derive(Debug)]
pub struct MarkovGenerator {
	id: String,
	name: String,
	description: String,
	corpus: Corpus,
	settings: MarkovSettings,
	chain: OnceCell<MarkovChain>,
}

impl MarkovGenerator {
	pub fn new(id: &str, name: &str, description: &str, corpus: Corpus, settings: MarkovSettings) -> Self {
		Self {
			id: id.to_owned(),
			name: name.to_owned(),
			description: description.to_owned(),
			corpus,
			settings,
			chain: OnceCell::new(),
		}
	}

	/// Returns the chain, building it on first access.
	///
	/// # Errors
	/// - `GeneratorUnavailable` if the corpus cannot be read or parsed
	/// - `DegenerateAlphabet` if the corpus yields no transitions
	pub fn chain(&self) -> Result<&MarkovChain> {
		self.chain.get_or_try_init(|| {
			let unavailable = |reason: String| PwgenError::GeneratorUnavailable { id: self.id.clone(), reason };
			let chain = match &self.corpus {
				Corpus::Embedded(text) => MarkovChain::from_text(text).map_err(unavailable)?,
				Corpus::File(path) => {
					MarkovChain::load_or_build(path).map_err(|e| unavailable(format!("{}: {e}", path.display())))?
				}
			};

			if chain.is_empty() {
				return Err(PwgenError::DegenerateAlphabet { id: self.id.clone(), size: 0 });
			}
			Ok(chain)
		})
	}

	pub fn settings(&self) -> &MarkovSettings {
		&self.settings
	}
}

impl Generator for MarkovGenerator {
	fn id(&self) -> &str {
		&self.id
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn description(&self) -> &str {
		&self.description
	}

	/// Configured per-word estimate. Builds the chain first so an unusable
	/// corpus is reported here rather than at generation time.
	fn entropy(&self) -> Result<f64> {
		self.chain()?;
		Ok(self.settings.entropy)
	}

	fn password(&self, target: &Target, rng: &dyn RandomSource) -> Result<Password> {
		let chain = self.chain()?;
		let words = PronounceableWords::new(chain, rng, self.settings.min_length, self.settings.max_length);
		join_words(words, target, self.settings.entropy)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::random::SeededRandom;

	fn generator(text: &'static str) -> MarkovGenerator {
		MarkovGenerator::new("m", "Markov", "", Corpus::Embedded(text), MarkovSettings::default())
	}

	#[test]
	fn test_strength_mode() {
		let generator = generator("it was the best of times it was the worst of times");
		let pw = generator.password(&Target::Strength(40.0), &SeededRandom::new(6)).unwrap();
		// ceil(40 / 13.43) = 3 words
		assert_eq!(pw.password.split('-').count(), 3);
		assert!(pw.entropy >= 40.0);
		assert!(pw.password.chars().all(|c| c == '-' || c.is_ascii_lowercase()));
	}

	#[test]
	fn test_length_mode() {
		let generator = generator("it was the best of times it was the worst of times");
		for seed in 0..10 {
			let pw = generator.password(&Target::Length(20), &SeededRandom::new(seed)).unwrap();
			let len = pw.password.chars().count();
			// words are at most max_length - 1 = 5 characters
			assert!((20..20 + 5 + 1).contains(&len), "length {len}");
		}
	}

	#[test]
	fn test_only_a() {
		let generator = generator("aaa");
		let pw = generator.password(&Target::Strength(128.0), &SeededRandom::new(1)).unwrap();
		assert!(pw.password.split('-').all(|w| !w.is_empty() && w.chars().all(|c| c == 'a')));
	}

	#[test]
	fn test_corpus_without_transitions() {
		let generator = generator("a b c 123");
		assert!(matches!(generator.entropy(), Err(PwgenError::DegenerateAlphabet { .. })));
	}

	#[test]
	fn test_missing_corpus_file() {
		let generator = MarkovGenerator::new(
			"m",
			"Markov",
			"",
			Corpus::File(PathBuf::from("/nonexistent/corpus.txt")),
			MarkovSettings::default(),
		);
		assert!(matches!(generator.entropy(), Err(PwgenError::GeneratorUnavailable { .. })));
	}
}
