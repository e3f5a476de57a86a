use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Represents a state in the character chain.
///
/// A `State` corresponds to one character (`key`) and stores all observed
/// transitions from this character to the next one.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during learning
/// - Pick the next character using weighted random sampling
/// - Merge with another state having the same key (parallel learning support)
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
/// - `total` is the sum of all occurrence counts
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct State {
	/// Identifier of the state.
	key: char,
	/// Outgoing transitions indexed by the next character, in character order.
	/// Example: { 'a' => 3, 'e' => 42 }
	transitions: BTreeMap<char, usize>,
	/// Sum of all occurrences.
	total: usize,
}

impl State {
	/// Creates a new empty state for the given character.
	pub fn new(key: char) -> Self {
		Self { key, transitions: BTreeMap::new(), total: 0 }
	}

	pub fn key(&self) -> char {
		self.key
	}

	/// Total number of observed outgoing transitions.
	pub fn total(&self) -> usize {
		self.total
	}

	/// Occurrences of `key → next`.
	pub fn count(&self, next: char) -> usize {
		self.transitions.get(&next).copied().unwrap_or(0)
	}

	/// `true` if nothing was ever observed after this character.
	pub fn is_dead_end(&self) -> bool {
		self.total == 0
	}

	/// Records an occurrence of a transition toward `next_char`.
	pub fn add_transition(&mut self, next_char: char) {
		*self.transitions.entry(next_char).or_insert(0) += 1;
		self.total += 1;
	}

	/// Picks the next character using weighted random sampling.
	///
	/// Draws `r` in `[0, total)` then walks the transitions, subtracting each
	/// weight until `r` falls inside one. O(n) over the transitions.
	///
	/// Returns `None` for a dead end.
	pub fn next(&self, rng: &dyn RandomSource) -> Option<char> {
		if self.is_dead_end() {
			return None;
		}

		let mut r = rng.below(self.total);
		for (next_char, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(*next_char);
			}
			r -= occurrence;
		}

		// Unreachable while `total` matches the transitions.
		self.transitions.keys().next_back().copied()
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same character. Counts are summed.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.key != other.key {
			return Err(format!("Key mismatch: {} != {}", self.key, other.key));
		}

		for (next_char, occurrence) in &other.transitions {
			*self.transitions.entry(*next_char).or_insert(0) += *occurrence;
		}
		self.total += other.total;

		Ok(())
	}
}
