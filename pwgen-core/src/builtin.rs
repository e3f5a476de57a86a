//! Built-in generator catalog.
//!
//! Ids are part of the settings format and must never change.

use std::sync::Arc;

use crate::config::Settings;
use crate::generator::charset::{CONFUSABLE, DIGITS, GERMAN_CHARS, HEX_DIGITS, LOWERCASE, PUNCTUATION, UPPERCASE};
use crate::generator::markov::Corpus;
use crate::generator::words::WordSource;
use crate::generator::{CharsetGenerator, Generator, MarkovGenerator, WordGenerator};

/// Opening paragraphs of *A Tale of Two Cities*.
pub const ENGLISH_SAMPLE: &str = include_str!("../data/english.txt");

/// Short German prose sample.
pub const GERMAN_SAMPLE: &str = include_str!("../data/german.txt");

/// Builds one built-in generator from the current settings.
pub type Factory = fn(&Settings) -> Arc<dyn Generator>;

/// Every built-in, in discovery order.
pub const BUILTINS: &[(&str, Factory)] = &[
	("ascii", ascii),
	("alphanumeric", alphanumeric),
	("alphanumeric-clear", alphanumeric_clear),
	("numeric", numeric),
	("hex", hex),
	("dictionary", dictionary),
	("pronounceable", pronounceable),
	("pronounceable-markov", pronounceable_markov),
	("german", german),
	("german-alphanumeric", german_alphanumeric),
	("pronounceable-german", pronounceable_german),
];

/// Looks up the factory of a built-in id.
pub fn factory(id: &str) -> Option<Factory> {
	BUILTINS.iter().find(|(builtin, _)| *builtin == id).map(|(_, f)| *f)
}

fn alphanumeric_chars() -> String {
	[UPPERCASE, LOWERCASE, DIGITS].concat()
}

fn clear_alphanumeric_chars() -> String {
	alphanumeric_chars().chars().filter(|c| !CONFUSABLE.contains(*c)).collect()
}

fn ascii_chars() -> String {
	[UPPERCASE, LOWERCASE, DIGITS, PUNCTUATION].concat()
}

fn ascii(_: &Settings) -> Arc<dyn Generator> {
	Arc::new(CharsetGenerator::new("ascii", "ASCII", "ASCII characters with punctuation", ascii_chars()))
}

fn alphanumeric(_: &Settings) -> Arc<dyn Generator> {
	Arc::new(CharsetGenerator::new("alphanumeric", "Alphanumeric", "ASCII characters, no punctuation", alphanumeric_chars()))
}

fn alphanumeric_clear(_: &Settings) -> Arc<dyn Generator> {
	Arc::new(CharsetGenerator::new(
		"alphanumeric-clear",
		"Clear Alphanumeric",
		"ASCII characters, no confusing characters or punctuation",
		clear_alphanumeric_chars(),
	))
}

fn numeric(_: &Settings) -> Arc<dyn Generator> {
	Arc::new(CharsetGenerator::new("numeric", "Numeric", "Digits only", DIGITS))
}

fn hex(_: &Settings) -> Arc<dyn Generator> {
	Arc::new(CharsetGenerator::new("hex", "Hexadecimal", "Hexadecimal characters", HEX_DIGITS))
}

fn dictionary(settings: &Settings) -> Arc<dyn Generator> {
	Arc::new(WordGenerator::new(
		"dictionary",
		"Dictionary",
		"Dictionary words",
		WordSource::File {
			path: settings.dictionary_path.clone(),
			max_length: Some(settings.dictionary_max_length),
		},
	))
}

fn pronounceable(_: &Settings) -> Arc<dyn Generator> {
	Arc::new(WordGenerator::new(
		"pronounceable",
		"Pronounceable Nonsense",
		"Pronounceable, (mostly) nonsense words",
		WordSource::Syllables,
	))
}

fn pronounceable_markov(settings: &Settings) -> Arc<dyn Generator> {
	Arc::new(MarkovGenerator::new(
		"pronounceable-markov",
		"Pronounceable Markov chain",
		"Pronounceable, Markov-chain-generated English",
		Corpus::Embedded(ENGLISH_SAMPLE),
		settings.markov.clone(),
	))
}

fn german(_: &Settings) -> Arc<dyn Generator> {
	Arc::new(CharsetGenerator::new(
		"german",
		"German",
		"German alphabet and digits with punctuation",
		ascii_chars() + GERMAN_CHARS,
	))
}

fn german_alphanumeric(_: &Settings) -> Arc<dyn Generator> {
	Arc::new(CharsetGenerator::new(
		"german-alphanumeric",
		"German Alphanumeric",
		"German alphabet and digits without punctuation",
		alphanumeric_chars() + GERMAN_CHARS,
	))
}

fn pronounceable_german(settings: &Settings) -> Arc<dyn Generator> {
	Arc::new(MarkovGenerator::new(
		"pronounceable-german",
		"German Pronounceable Markov",
		"Pronounceable passwords based on German",
		Corpus::Embedded(GERMAN_SAMPLE),
		settings.markov.clone(),
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entropy::Target;
	use crate::random::SeededRandom;

	fn size_of(factory: Factory) -> usize {
		let entropy = factory(&Settings::default()).entropy().unwrap();
		2f64.powf(entropy).round() as usize
	}

	#[test]
	fn test_factory_ids_match() {
		let settings = Settings::default();
		for (id, factory) in BUILTINS {
			assert_eq!(factory(&settings).id(), *id);
		}
		assert!(factory("ascii").is_some());
		assert!(factory("klingon").is_none());
	}

	#[test]
	fn test_alphabet_sizes() {
		assert_eq!(size_of(ascii), 26 + 26 + 10 + 29);
		assert_eq!(size_of(alphanumeric), 62);
		assert_eq!(size_of(alphanumeric_clear), 62 - 8);
		assert_eq!(size_of(numeric), 10);
		assert_eq!(size_of(hex), 16);
		assert_eq!(size_of(german), 91 + 7);
		assert_eq!(size_of(german_alphanumeric), 62 + 7);
	}

	#[test]
	fn test_clear_alphanumeric_excludes_confusables() {
		let clear = clear_alphanumeric_chars();
		for c in ['l', '1', '0', 'O', 'i', 'I', 'L', 'o'] {
			assert!(!clear.contains(c), "`{c}` should be excluded");
		}

		let generator = alphanumeric_clear(&Settings::default());
		let pw = generator.password(&Target::Length(2000), &SeededRandom::new(12)).unwrap();
		assert!(!pw.password.chars().any(|c| CONFUSABLE.contains(c)));
	}

	#[test]
	fn test_ascii_excludes_backslash_and_tilde() {
		let chars = ascii_chars();
		assert!(!chars.contains('\\'));
		assert!(!chars.contains('~'));
		assert!(!chars.contains('`'));
	}

	#[test]
	fn test_markov_builtins_build() {
		let settings = Settings::default();
		for f in [pronounceable_markov, pronounceable_german] {
			assert_eq!(f(&settings).entropy().unwrap(), settings.markov.entropy);
		}
	}
}
