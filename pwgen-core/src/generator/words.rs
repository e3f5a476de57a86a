use std::collections::BTreeSet;
use std::path::PathBuf;

use log::debug;
use once_cell::sync::OnceCell;

use super::{Generator, Password, join_words};
use crate::entropy::{Target, entropy_of_choice};
use crate::error::{PwgenError, Result};
use crate::io::read_file;
use crate::random::RandomSource;

const VOWELS: &str = "aeiou";

/// Consonant clusters that can start a syllable, on top of single consonants.
const INITIAL_CLUSTERS: [&str; 20] = [
	"bl", "br", "cl", "cr", "dr", "fl", "fr", "gl", "gr", "pl", "pr", "sk", "sl", "sm", "sn", "sp", "st", "str", "sw",
	"tr",
];

/// Consonant clusters that can end a syllable, on top of single consonants.
const FINAL_CLUSTERS: [&str; 12] = ["ct", "ft", "mp", "nd", "ng", "nk", "nt", "pt", "sk", "sp", "ss", "st"];

/// Where a `WordGenerator` gets its words from.
#[derive(Debug, Clone)]
pub enum WordSource {
	/// Consonant-vowel-consonant syllables.
	Syllables,
	/// One word per line. Words longer than `max_length` characters are ignored.
	File { path: PathBuf, max_length: Option<usize> },
	/// A fixed list, normalized like a file.
	List { words: Vec<String>, max_length: Option<usize> },
}

/// Generates passwords from words drawn uniformly, with replacement.
///
/// The word set is loaded on first use, deduplicated, lowercased and sorted,
/// then cached for the life of the generator.
#[derive(Debug)]
pub struct WordGenerator {
	id: String,
	name: String,
	description: String,
	source: WordSource,
	words: OnceCell<Vec<String>>,
}

impl WordGenerator {
	pub fn new(id: &str, name: &str, description: &str, source: WordSource) -> Self {
		Self {
			id: id.to_owned(),
			name: name.to_owned(),
			description: description.to_owned(),
			source,
			words: OnceCell::new(),
		}
	}

	/// Returns the word set, loading it on first access.
	///
	/// # Errors
	/// - `GeneratorUnavailable` if the word file cannot be read
	/// - `DegenerateAlphabet` if fewer than 2 words remain
	pub fn words(&self) -> Result<&[String]> {
		self.words
			.get_or_try_init(|| {
				let words = match &self.source {
					WordSource::Syllables => syllables(),
					WordSource::File { path, max_length } => {
						let lines = read_file(path).map_err(|e| PwgenError::GeneratorUnavailable {
							id: self.id.clone(),
							reason: format!("{}: {e}", path.display()),
						})?;
						normalize(lines, *max_length)
					}
					WordSource::List { words, max_length } => normalize(words.iter().cloned(), *max_length),
				};

				if words.len() < 2 {
					return Err(PwgenError::DegenerateAlphabet { id: self.id.clone(), size: words.len() });
				}
				debug!("Word set for `{}` : {} words", self.id, words.len());
				Ok(words)
			})
			.map(Vec::as_slice)
	}

	/// Length in characters of the longest word.
	pub fn max_word_width(&self) -> Result<usize> {
		Ok(self.words()?.iter().map(|w| w.chars().count()).max().unwrap_or(0))
	}
}

impl Generator for WordGenerator {
	fn id(&self) -> &str {
		&self.id
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn description(&self) -> &str {
		&self.description
	}

	fn entropy(&self) -> Result<f64> {
		Ok(entropy_of_choice(self.words()?.len()))
	}

	fn password(&self, target: &Target, rng: &dyn RandomSource) -> Result<Password> {
		let words = self.words()?;
		let draws = std::iter::repeat_with(|| words[rng.below(words.len())].clone());
		join_words(draws, target, entropy_of_choice(words.len()))
	}
}

/// Trims, drops empty and over-long entries, lowercases and deduplicates.
fn normalize<I>(words: I, max_length: Option<usize>) -> Vec<String>
where
	I: IntoIterator<Item = String>,
{
	words
		.into_iter()
		.map(|w| w.trim().to_lowercase())
		.filter(|w| !w.is_empty())
		.filter(|w| max_length.is_none_or(|max| w.chars().count() <= max))
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect()
}

/// Every initial × vowel × final combination, deduplicated and sorted.
pub fn syllables() -> Vec<String> {
	let consonants = || ('a'..='z').filter(|c| !VOWELS.contains(*c));

	let initials: BTreeSet<String> = consonants()
		.filter(|c| !"qxc".contains(*c))
		.map(String::from)
		.chain(INITIAL_CLUSTERS.iter().map(|s| (*s).to_owned()))
		.collect();
	let finals: BTreeSet<String> = consonants()
		.filter(|c| !"qxcsj".contains(*c))
		.map(String::from)
		.chain(FINAL_CLUSTERS.iter().map(|s| (*s).to_owned()))
		.collect();

	let mut syllables = BTreeSet::new();
	for initial in &initials {
		for vowel in VOWELS.chars() {
			for last in &finals {
				syllables.insert(format!("{initial}{vowel}{last}"));
			}
		}
	}
	syllables.into_iter().collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::random::SeededRandom;

	fn list(words: &[&str]) -> WordGenerator {
		WordGenerator::new(
			"test",
			"Test",
			"",
			WordSource::List { words: words.iter().map(|w| (*w).to_owned()).collect(), max_length: Some(6) },
		)
	}

	#[test]
	fn test_syllable_space() {
		let s = syllables();
		// 38 initials, 5 vowels, 28 finals
		assert_eq!(s.len(), 38 * 5 * 28);
		assert!(s.contains(&"strang".to_owned()));
		assert!(!s.iter().any(|w| w.starts_with('q') || w.ends_with('j')));
	}

	#[test]
	fn test_normalize() {
		let generator = list(&["Apple", "apple", " pear ", "", "watermelon", "fig"]);
		assert_eq!(generator.words().unwrap(), &["apple", "fig", "pear"]);
		assert_eq!(generator.max_word_width().unwrap(), 5);
	}

	#[test]
	fn test_strength_mode() {
		let generator = list(&["ab", "cd", "ef", "gh"]);
		let pw = generator.password(&Target::Strength(5.0), &SeededRandom::new(1)).unwrap();
		assert_eq!(pw.entropy, 6.0);
		assert_eq!(pw.password.split('-').count(), 3);
	}

	#[test]
	fn test_length_mode_never_truncates() {
		let generator = list(&["abc", "defg"]);
		for seed in 0..20 {
			let pw = generator.password(&Target::Length(10), &SeededRandom::new(seed)).unwrap();
			assert!(pw.password.len() >= 10);
			assert!(pw.password.len() < 10 + 4 + 1);
			assert!(pw.password.split('-').all(|w| w == "abc" || w == "defg"));
		}
	}

	#[test]
	fn test_missing_file_is_unavailable() {
		let generator = WordGenerator::new(
			"dictionary",
			"Dictionary",
			"",
			WordSource::File { path: PathBuf::from("/nonexistent/words"), max_length: Some(6) },
		);
		assert!(matches!(generator.entropy(), Err(PwgenError::GeneratorUnavailable { .. })));
	}

	#[test]
	fn test_word_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("words");
		std::fs::write(&path, "Cat\ndog\n\nelephant\ncat\nowl\n").unwrap();
		let generator = WordGenerator::new("d", "D", "", WordSource::File { path, max_length: Some(6) });
		assert_eq!(generator.words().unwrap(), &["cat", "dog", "owl"]);
	}

	#[test]
	fn test_single_word_is_degenerate() {
		let generator = list(&["only"]);
		assert!(matches!(generator.entropy(), Err(PwgenError::DegenerateAlphabet { size: 1, .. })));
	}
}
