//! Character-level Markov chain used by the pronounceable generators.
//!
//! - `State`: outgoing transition counts of one character
//! - `MarkovChain`: all states of a corpus, with parallel construction,
//!   merging and a binary cache
//! - `PronounceableWords`: lazy word sequence walked from a chain

/// Internal representation of a single chain state.
///
/// Tracks outgoing transitions and supports weighted random sampling.
pub mod state;

/// Transition model built from a corpus.
pub mod chain;

/// Word sequence generation.
pub mod words;

pub use chain::MarkovChain;
pub use state::State;
pub use words::PronounceableWords;
