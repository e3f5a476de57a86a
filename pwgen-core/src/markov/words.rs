use super::chain::MarkovChain;
use crate::random::RandomSource;

/// Unbounded lazy sequence of pronounceable words walked from a chain.
///
/// Each word gets a target length drawn uniformly from `[min_length, max_length)`.
/// Words can come out shorter when the walk hits a dead end, but never empty
/// as long as the chain has at least one state.
pub struct PronounceableWords<'a> {
	chain: &'a MarkovChain,
	rng: &'a dyn RandomSource,
	min_length: usize,
	max_length: usize,
}

impl<'a> PronounceableWords<'a> {
	pub fn new(chain: &'a MarkovChain, rng: &'a dyn RandomSource, min_length: usize, max_length: usize) -> Self {
		Self { chain, rng, min_length, max_length }
	}
}

impl Iterator for PronounceableWords<'_> {
	type Item = String;

	fn next(&mut self) -> Option<String> {
		let length = self.rng.between(self.min_length, self.max_length);
		let word = self.chain.walk(length, self.rng);
		if word.is_empty() { None } else { Some(word) }
	}
}
