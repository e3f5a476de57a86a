use std::collections::HashSet;

use log::debug;
use once_cell::sync::OnceCell;

use super::{Generator, Password};
use crate::entropy::{Target, entropy_for, entropy_of_choice};
use crate::error::{PwgenError, Result};
use crate::random::RandomSource;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const HEX_DIGITS: &str = "0123456789abcdef";

/// ASCII punctuation minus backslash, backtick and tilde.
pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[]^_{|}";

/// Characters easily mistaken for one another.
pub const CONFUSABLE: &str = "iIlL10Oo";

/// Umlauts and sharp s.
pub const GERMAN_CHARS: &str = "ÄäÖöÜüß";

/// Generates passwords by drawing characters uniformly from an alphabet.
///
/// # Invariants
/// - The alphabet holds at least 2 distinct characters
/// - Every character is drawn with the same probability
///
/// The alphabet is deduplicated on first use (first occurrence wins) and
/// then cached for the life of the generator.
#[derive(Debug)]
pub struct CharsetGenerator {
	id: String,
	name: String,
	description: String,
	characters: String,
	alphabet: OnceCell<Vec<char>>,
}

impl CharsetGenerator {
	pub fn new(id: &str, name: &str, description: &str, characters: impl Into<String>) -> Self {
		Self {
			id: id.to_owned(),
			name: name.to_owned(),
			description: description.to_owned(),
			characters: characters.into(),
			alphabet: OnceCell::new(),
		}
	}

	/// Returns the alphabet, building it on first access.
	///
	/// # Errors
	/// `DegenerateAlphabet` if fewer than 2 distinct characters remain.
	pub fn alphabet(&self) -> Result<&[char]> {
		self.alphabet
			.get_or_try_init(|| {
				let mut seen = HashSet::new();
				let alphabet: Vec<char> = self.characters.chars().filter(|c| seen.insert(*c)).collect();
				if alphabet.len() < 2 {
					return Err(PwgenError::DegenerateAlphabet { id: self.id.clone(), size: alphabet.len() });
				}
				debug!("Alphabet for `{}` : {} characters", self.id, alphabet.len());
				Ok(alphabet)
			})
			.map(Vec::as_slice)
	}
}

impl Generator for CharsetGenerator {
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
		Ok(entropy_of_choice(self.alphabet()?.len()))
	}

	fn password(&self, target: &Target, rng: &dyn RandomSource) -> Result<Password> {
		let alphabet = self.alphabet()?;
		let entropy = entropy_of_choice(alphabet.len());
		let iterations = target.iterations(entropy)?;
		if iterations == 0 {
			return Ok(Password::empty());
		}

		let password: String = (0..iterations).map(|_| alphabet[rng.below(alphabet.len())]).collect();
		Ok(Password { password, entropy: entropy_for(iterations, entropy) })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::random::SeededRandom;

	fn hex() -> CharsetGenerator {
		CharsetGenerator::new("hex", "Hexadecimal", "Hexadecimal characters", HEX_DIGITS)
	}

	#[test]
	fn test_length_mode_exact() {
		let rng = SeededRandom::new(3);
		let pw = hex().password(&Target::Length(20), &rng).unwrap();
		assert_eq!(pw.password.chars().count(), 20);
		assert!(pw.password.chars().all(|c| HEX_DIGITS.contains(c)));
		assert_eq!(pw.entropy, 80.0);
	}

	#[test]
	fn test_zero_length() {
		let pw = hex().password(&Target::Length(0), &SeededRandom::new(0)).unwrap();
		assert_eq!(pw.password, "");
		assert_eq!(pw.entropy, 0.0);
	}

	#[test]
	fn test_strength_mode_rounds_up() {
		let pw = hex().password(&Target::Strength(10.0), &SeededRandom::new(9)).unwrap();
		assert_eq!(pw.password.len(), 3);
		assert_eq!(pw.entropy, 12.0);
	}

	#[test]
	fn test_duplicates_removed() {
		let generator = CharsetGenerator::new("ab", "AB", "", "abab");
		assert_eq!(generator.alphabet().unwrap(), &['a', 'b']);
		assert_eq!(generator.entropy().unwrap(), 1.0);
	}

	#[test]
	fn test_degenerate_alphabet() {
		let generator = CharsetGenerator::new("one", "One", "", "aaaa");
		assert!(matches!(generator.entropy(), Err(PwgenError::DegenerateAlphabet { size: 1, .. })));

		let generator = CharsetGenerator::new("none", "None", "", "");
		assert!(matches!(
			generator.password(&Target::Length(5), &SeededRandom::new(0)),
			Err(PwgenError::DegenerateAlphabet { size: 0, .. })
		));
	}

	#[test]
	fn test_multibyte_alphabet() {
		let generator = CharsetGenerator::new("umlauts", "Umlauts", "", GERMAN_CHARS);
		let pw = generator.password(&Target::Length(12), &SeededRandom::new(5)).unwrap();
		assert_eq!(pw.password.chars().count(), 12);
		assert!(pw.password.chars().all(|c| GERMAN_CHARS.contains(c)));
	}
}
