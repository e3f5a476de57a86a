//! Password generators.
//!
//! Two families share the `Generator` trait:
//! - Character generators (`CharsetGenerator`): one unit = one character
//! - Word generators (`WordGenerator`, `MarkovGenerator`): one unit = one
//!   word, words joined with `-` which carries no entropy

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entropy::{Target, entropy_for};
use crate::error::Result;
use crate::random::RandomSource;

/// Character-based generators over a fixed alphabet.
pub mod charset;

/// Uniform-choice word generators (word lists, syllables).
pub mod words;

/// Pronounceable words walked from a Markov chain.
pub mod markov;

pub use charset::CharsetGenerator;
pub use markov::MarkovGenerator;
pub use words::WordGenerator;

/// Separator placed between words. Not counted as entropy.
pub const WORD_SEPARATOR: char = '-';

/// A generated password and the entropy it actually carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Password {
	pub password: String,
	pub entropy: f64,
}

impl Password {
	pub fn empty() -> Self {
		Self { password: String::new(), entropy: 0.0 }
	}
}

/// A pluggable password generation algorithm.
///
/// # Contract
/// - `id` is short and stable; settings refer to generators by id.
/// - `entropy` is the entropy of one output unit in bits. It may need to
///   load the generator's data on first call, hence the `Result`.
/// - `password` honours the target: exact character length for character
///   generators, at least the requested length for word generators, and at
///   least the requested strength in strength mode.
pub trait Generator: Send + Sync {
	fn id(&self) -> &str;

	fn name(&self) -> &str;

	fn description(&self) -> &str;

	/// Bits of entropy per output unit.
	fn entropy(&self) -> Result<f64>;

	/// Generates one password for `target`.
	fn password(&self, target: &Target, rng: &dyn RandomSource) -> Result<Password>;
}

impl fmt::Debug for dyn Generator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Generator")
			.field("id", &self.id())
			.field("name", &self.name())
			.finish()
	}
}

/// Identity of a generator, used for display and by the HTTP surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
	pub id: String,
	pub name: String,
	pub description: String,
	pub entropy: f64,
}

/// Joins words drawn from `words` until `target` is met.
///
/// - Strength: draws `ceil(bits / per_word)` words.
/// - Length: draws until the joined password (separators included) reaches
///   the requested number of characters. The last word is never cut, so the
///   result may overshoot by one separator and one word.
///
/// `words` must be unbounded and must never yield an empty word in length
/// mode, otherwise the loop cannot make progress.
///
/// # Errors
/// `InvalidTarget` if the target is out of bounds or needs too many words.
pub(crate) fn join_words<I>(mut words: I, target: &Target, per_word: f64) -> Result<Password>
where
	I: Iterator<Item = String>,
{
	target.check()?;
	let mut chosen: Vec<String> = Vec::new();

	match *target {
		Target::Strength(_) => {
			let iterations = target.iterations(per_word)?;
			chosen.extend(words.by_ref().take(iterations));
		}
		Target::Length(length) => {
			let mut pw_length = 0;
			while pw_length < length {
				let Some(word) = words.next() else { break };
				if !chosen.is_empty() {
					pw_length += 1;
				}
				pw_length += word.chars().count();
				chosen.push(word);
			}
		}
	}

	let entropy = entropy_for(chosen.len(), per_word);
	Ok(Password { password: chosen.join(&WORD_SEPARATOR.to_string()), entropy })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cycle(words: &[&str]) -> impl Iterator<Item = String> {
		words.iter().map(|w| (*w).to_owned()).collect::<Vec<_>>().into_iter().cycle()
	}

	#[test]
	fn test_join_by_strength() {
		let pw = join_words(cycle(&["abc", "de"]), &Target::Strength(10.0), 4.0).unwrap();
		assert_eq!(pw.password, "abc-de-abc");
		assert_eq!(pw.entropy, 12.0);
	}

	#[test]
	fn test_join_by_length_counts_separators() {
		// "abc" (3) < 4, "abc-de" (6) >= 4
		let pw = join_words(cycle(&["abc", "de"]), &Target::Length(4), 4.0).unwrap();
		assert_eq!(pw.password, "abc-de");
		assert_eq!(pw.entropy, 8.0);

		// Exact fit stops without an extra word
		let pw = join_words(cycle(&["abc", "de"]), &Target::Length(3), 4.0).unwrap();
		assert_eq!(pw.password, "abc");
	}

	#[test]
	fn test_join_rejects_oversized_targets() {
		assert!(join_words(cycle(&["abc"]), &Target::Length(usize::MAX), 4.0).is_err());
		assert!(join_words(cycle(&["abc"]), &Target::Strength(1e12), 4.0).is_err());
	}

	#[test]
	fn test_join_zero_length() {
		let pw = join_words(cycle(&["abc"]), &Target::Length(0), 4.0).unwrap();
		assert_eq!(pw, Password::empty());
	}
}
