use std::collections::BTreeMap;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::state::State;
use crate::error::Result;
use crate::io::{cache_path, is_fresh, read_text};
use crate::random::RandomSource;

/// First-order Markov chain over characters.
///
/// The chain maps each character to a `State` counting the characters seen
/// right after it, inside whitespace-delimited tokens of a corpus.
///
/// # Invariants
/// - Only characters with at least one successor are stored as states
/// - A chain is read-only once built; walks never mutate it
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MarkovChain {
	states: BTreeMap<char, State>,
}

impl MarkovChain {
	/// Lowercases `sample` and removes ASCII punctuation and digits.
	///
	/// Whitespace is kept so the text can still be split into tokens.
	pub fn clean(sample: &str) -> String {
		sample
			.chars()
			.flat_map(char::to_lowercase)
			.filter(|c| !c.is_ascii_punctuation() && !c.is_ascii_digit())
			.collect()
	}

	/// Builds a chain from raw corpus text.
	///
	/// # Behavior
	/// - Cleans the text (see `clean`) and splits it on whitespace.
	/// - Splits the tokens into chunks (based on CPU cores * factor).
	/// - Spawns threads to build partial chains for each chunk.
	/// - Merges all partial chains.
	pub fn from_text(sample: &str) -> std::result::Result<Self, String> {
		let tokens: Vec<String> = Self::clean(sample).split_whitespace().map(str::to_owned).collect();
		if tokens.is_empty() {
			return Ok(Self::default());
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = tokens.len().div_ceil(chunks).max(1);

		let (tx, rx) = mpsc::channel();
		for chunk in tokens.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();

			thread::spawn(move || {
				let mut partial_chain = MarkovChain::default();
				for token in chunk {
					partial_chain.add_token(&token);
				}
				// The receiver outlives every sender.
				let _ = tx.send(partial_chain);
			});
		}
		drop(tx);

		let mut final_chain = MarkovChain::default();
		for partial_chain in rx.iter() {
			final_chain.merge(&partial_chain)?;
		}

		debug!("Markov chain built from {} tokens : {} states", tokens.len(), final_chain.len());
		Ok(final_chain)
	}

	/// Loads the chain for a corpus file, using a binary cache when possible.
	///
	/// # Behavior
	/// - Reuses the sibling `.bin` file (`postcard`) if it is newer than the corpus.
	/// - Otherwise builds the chain from the corpus and rewrites the cache.
	/// - A corrupt cache is rebuilt; a cache that cannot be written is skipped.
	///
	/// # Errors
	/// Fails if the corpus cannot be read.
	pub fn load_or_build<P: AsRef<Path>>(corpus_path: P) -> Result<Self> {
		let corpus_path = corpus_path.as_ref();
		let binary_data_path = cache_path(corpus_path)?;

		if is_fresh(corpus_path, &binary_data_path) {
			match std::fs::read(&binary_data_path).map_err(Into::into).and_then(|bytes| Self::from_bytes(&bytes)) {
				Ok(chain) => {
					debug!("Loaded cached chain `{}`", binary_data_path.display());
					return Ok(chain);
				}
				Err(e) => warn!("Ignoring chain cache `{}` : {e}", binary_data_path.display()),
			}
		}

		let sample = read_text(corpus_path)?;
		let chain = Self::from_text(&sample)
			.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

		match postcard::to_stdvec(&chain) {
			Ok(bytes) => {
				if let Err(e) = std::fs::write(&binary_data_path, bytes) {
					warn!("Could not write chain cache `{}` : {e}", binary_data_path.display());
				}
			}
			Err(e) => warn!("Could not encode chain cache : {e}"),
		}

		Ok(chain)
	}

	fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Ok(postcard::from_bytes(bytes)?)
	}

	/// Adds the transitions between consecutive characters of `token`.
	pub fn add_token(&mut self, token: &str) {
		let mut chars = token.chars();
		let Some(mut current) = chars.next() else { return };
		for next in chars {
			self.states.entry(current).or_insert_with(|| State::new(current)).add_transition(next);
			current = next;
		}
	}

	/// Number of states with outgoing transitions.
	pub fn len(&self) -> usize {
		self.states.values().filter(|s| !s.is_dead_end()).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn state(&self, key: char) -> Option<&State> {
		self.states.get(&key)
	}

	/// Picks a uniformly random starting state among states with successors.
	pub fn start(&self, rng: &dyn RandomSource) -> Option<char> {
		let starts: Vec<char> = self.states.values().filter(|s| !s.is_dead_end()).map(State::key).collect();
		if starts.is_empty() {
			return None;
		}
		Some(starts[rng.below(starts.len())])
	}

	/// Picks the state following `current`. `None` on a dead end.
	pub fn next(&self, current: char, rng: &dyn RandomSource) -> Option<char> {
		self.states.get(&current)?.next(rng)
	}

	/// Walks the chain from a random start and returns up to `length` states.
	///
	/// The starting state itself is not emitted. The walk stops early on a
	/// dead end, so the result may be shorter than `length`.
	pub fn walk(&self, length: usize, rng: &dyn RandomSource) -> String {
		let mut word = String::new();
		let Some(mut state) = self.start(rng) else { return word };

		for _ in 0..length {
			match self.next(state, rng) {
				Some(next) => {
					word.push(next);
					state = next;
				}
				None => break,
			}
		}
		word
	}

	/// Merges another chain into this one.
	///
	/// Existing states are merged in place; missing ones are cloned.
	pub fn merge(&mut self, other: &Self) -> std::result::Result<(), String> {
		for (k, s) in &other.states {
			if let Some(existing) = self.states.get_mut(k) {
				existing.merge(s)?;
			} else {
				self.states.insert(*k, s.clone());
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::random::SeededRandom;

	#[test]
	fn test_clean() {
		assert_eq!(MarkovChain::clean("It was the 2nd, WAS it?"), "it was the nd was it");
		assert_eq!(MarkovChain::clean("Größe!"), "größe");
	}

	#[test]
	fn test_transitions_stay_within_tokens() {
		let chain = MarkovChain::from_text("ab cd").unwrap();
		assert_eq!(chain.state('a').unwrap().count('b'), 1);
		assert_eq!(chain.state('c').unwrap().count('d'), 1);
		// 'b' ends a token: no 'b' → 'c' across the space
		assert!(chain.state('b').is_none());
		assert_eq!(chain.len(), 2);
	}

	#[test]
	fn test_single_letter_corpus() {
		let chain = MarkovChain::from_text("aaa").unwrap();
		let rng = SeededRandom::new(4);
		for _ in 0..20 {
			let word = chain.walk(5, &rng);
			assert_eq!(word, "aaaaa");
		}
	}

	#[test]
	fn test_dead_end_shortens_word() {
		// a → b → c, then nothing follows c
		let chain = MarkovChain::from_text("abc").unwrap();
		let rng = SeededRandom::new(2);
		for _ in 0..20 {
			let word = chain.walk(10, &rng);
			assert!(word == "bc" || word == "c", "unexpected walk {word}");
		}
	}

	#[test]
	fn test_empty_corpus() {
		let chain = MarkovChain::from_text("1 2 3 ... a b").unwrap();
		assert!(chain.is_empty());
		assert_eq!(chain.walk(4, &SeededRandom::new(0)), "");
	}

	#[test]
	fn test_parallel_build_matches_sequential() {
		let text = "the quick brown fox jumps over the lazy dog ".repeat(50);
		let parallel = MarkovChain::from_text(&text).unwrap();

		let mut sequential = MarkovChain::default();
		for token in MarkovChain::clean(&text).split_whitespace() {
			sequential.add_token(token);
		}
		assert_eq!(parallel, sequential);
	}

	#[test]
	fn test_load_or_build_writes_cache() {
		let dir = tempfile::tempdir().unwrap();
		let corpus = dir.path().join("corpus.txt");
		std::fs::write(&corpus, "banana bandana").unwrap();

		let built = MarkovChain::load_or_build(&corpus).unwrap();
		let cache = dir.path().join("corpus.bin");
		assert!(cache.exists());

		let cached = MarkovChain::load_or_build(&corpus).unwrap();
		assert_eq!(built, cached);
	}

	#[test]
	fn test_load_or_build_missing_corpus() {
		let dir = tempfile::tempdir().unwrap();
		assert!(MarkovChain::load_or_build(dir.path().join("missing.txt")).is_err());
	}
}
