//! Settings consumed by the generators and the generation session.
//!
//! Every field has a default, so a settings file only needs the values it
//! changes:
//!
//! ```json
//! { "pw_length": 24, "generators": ["ascii", "pronounceable"] }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entropy::{ENTROPY_PER_LEVEL, MAX_LENGTH, MAX_STRENGTH_BITS};
use crate::error::{PwgenError, Result};
use crate::io::read_text;

/// Default password length in characters.
pub const DEFAULT_PW_LENGTH: usize = 20;

/// Default password strength in levels.
pub const DEFAULT_PW_STRENGTH: u32 = 3;

/// Tunables of the Markov-chain generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkovSettings {
	/// Shortest word length (inclusive).
	pub min_length: usize,
	/// Longest word length (exclusive).
	pub max_length: usize,
	/// Assumed entropy of one word in bits.
	///
	/// An approximation calibrated on the English sample, not measured at
	/// runtime. Keep it conservative.
	pub entropy: f64,
}

impl Default for MarkovSettings {
	fn default() -> Self {
		Self { min_length: 3, max_length: 6, entropy: 13.43 }
	}
}

impl MarkovSettings {
	pub fn validate(&self) -> std::result::Result<(), String> {
		if self.min_length == 0 {
			return Err("min_length must be at least 1".to_owned());
		}
		if self.max_length <= self.min_length {
			return Err(format!(
				"max_length ({}) must be greater than min_length ({})",
				self.max_length, self.min_length
			));
		}
		if !self.entropy.is_finite() || self.entropy <= 0.0 {
			return Err(format!("entropy must be positive, got {}", self.entropy));
		}
		Ok(())
	}
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Length used when a length request carries no value.
	pub pw_length: usize,
	/// Strength in levels used when a strength request carries no value.
	pub pw_strength: u32,
	/// Generators enabled by default. Empty means all.
	pub generators: Vec<String>,
	/// Word list of the `dictionary` generator.
	pub dictionary_path: PathBuf,
	/// Dictionary words longer than this are ignored.
	pub dictionary_max_length: usize,
	pub markov: MarkovSettings,
	/// Directory of user generator definitions, if any.
	pub user_generators_dir: Option<PathBuf>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			pw_length: DEFAULT_PW_LENGTH,
			pw_strength: DEFAULT_PW_STRENGTH,
			generators: ["ascii", "alphanumeric", "alphanumeric-clear", "pronounceable", "numeric", "dictionary"]
				.iter()
				.map(|s| (*s).to_owned())
				.collect(),
			dictionary_path: PathBuf::from("/usr/share/dict/words"),
			dictionary_max_length: 6,
			markov: MarkovSettings::default(),
			user_generators_dir: None,
		}
	}
}

impl Settings {
	/// Reads settings from a JSON file and validates them.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let settings: Settings = serde_json::from_str(&read_text(path)?)?;
		settings.validate()?;
		Ok(settings)
	}

	pub fn validate(&self) -> Result<()> {
		if self.pw_strength == 0 {
			return Err(PwgenError::InvalidSettings("pw_strength must be at least 1".to_owned()));
		}
		if self.pw_strength as f64 * ENTROPY_PER_LEVEL as f64 > MAX_STRENGTH_BITS {
			return Err(PwgenError::InvalidSettings(format!("pw_strength exceeds {MAX_STRENGTH_BITS} bits")));
		}
		if self.pw_length > MAX_LENGTH {
			return Err(PwgenError::InvalidSettings(format!("pw_length exceeds {MAX_LENGTH} characters")));
		}
		if self.dictionary_max_length == 0 {
			return Err(PwgenError::InvalidSettings("dictionary_max_length must be at least 1".to_owned()));
		}
		self.markov.validate().map_err(|e| PwgenError::InvalidSettings(format!("markov: {e}")))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_are_valid() {
		let settings = Settings::default();
		assert!(settings.validate().is_ok());
		assert_eq!(settings.pw_length, 20);
		assert_eq!(settings.markov.entropy, 13.43);
	}

	#[test]
	fn test_partial_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("settings.json");
		std::fs::write(&path, r#"{ "pw_length": 32, "markov": { "entropy": 10.0 } }"#).unwrap();

		let settings = Settings::load(&path).unwrap();
		assert_eq!(settings.pw_length, 32);
		assert_eq!(settings.markov.entropy, 10.0);
		assert_eq!(settings.markov.min_length, 3);
		assert_eq!(settings.generators, Settings::default().generators);
	}

	#[test]
	fn test_invalid_band() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("settings.json");
		std::fs::write(&path, r#"{ "markov": { "min_length": 6, "max_length": 6 } }"#).unwrap();
		assert!(matches!(Settings::load(&path), Err(PwgenError::InvalidSettings(_))));
	}

	#[test]
	fn test_oversized_defaults() {
		let settings = Settings { pw_length: MAX_LENGTH + 1, ..Settings::default() };
		assert!(matches!(settings.validate(), Err(PwgenError::InvalidSettings(_))));

		let settings = Settings { pw_strength: 129, ..Settings::default() };
		assert!(matches!(settings.validate(), Err(PwgenError::InvalidSettings(_))));
	}

	#[test]
	fn test_malformed_json() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("settings.json");
		std::fs::write(&path, "{ not json").unwrap();
		assert!(matches!(Settings::load(&path), Err(PwgenError::Json(_))));
	}
}
