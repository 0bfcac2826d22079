use std::collections::BTreeMap;

use rand::Rng;

use super::context::Context;
use crate::config::Smoothing;
use crate::error::{ModelError, Result};

/// Represents a context in a word n-gram model.
///
/// A `State` corresponds to a fixed `n-1` token context (`key`) and stores
/// every observed continuation of that context together with the context
/// total.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their smoothed likelihood.
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
/// - `total` is at least the sum of the transition counts
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct State {
	/// Identifier of the state.
	key: Context,
	/// Outgoing transitions indexed by the next token.
	/// Ordered so that sampling with a seeded RNG is reproducible.
	transitions: BTreeMap<String, usize>,
	/// Context total (see `ContextTotals`).
	total: usize,
}

impl State {
	/// Creates a new empty state for the given context.
	pub fn new(key: Context) -> Self {
		Self { key, transitions: BTreeMap::new(), total: 0 }
	}

	/// Records an occurrence of a transition toward `next_word`.
	pub fn add_transition(&mut self, next_word: &str) {
		match self.transitions.get_mut(next_word) {
			Some(occurrence) => *occurrence += 1,
			None => {
				self.transitions.insert(next_word.to_owned(), 1);
			}
		}
	}

	pub fn add_total(&mut self, amount: usize) {
		self.total += amount;
	}

	pub fn total(&self) -> usize {
		self.total
	}

	/// Number of distinct continuations.
	pub fn distinct(&self) -> usize {
		self.transitions.len()
	}

	/// Occurrences of `next_word` after this context, zero if never seen.
	pub fn count(&self, next_word: &str) -> usize {
		self.transitions.get(next_word).copied().unwrap_or(0)
	}

	pub fn transitions(&self) -> impl Iterator<Item = (&str, usize)> {
		self.transitions.iter().map(|(word, occurrence)| (word.as_str(), *occurrence))
	}

	/// Smoothed weight of every continuation, in token order.
	pub fn weights(&self, smoothing: Smoothing, smoothing_factor: f64) -> Vec<(&str, f64)> {
		let distinct = self.distinct();
		self.transitions()
			.map(|(word, occurrence)| {
				let weight = smoothing
					.weight(occurrence, self.total, distinct, smoothing_factor)
					.unwrap_or(0.0);
				(word, weight)
			})
			.collect()
	}

	/// Predicts the next token using weighted random sampling.
	///
	/// The probability of selecting a token is proportional to its smoothed
	/// weight. When every weight is zero the choice is uniform.
	///
	/// Returns `None` if the state has no transitions.
	pub fn predict<R: Rng>(&self, smoothing: Smoothing, smoothing_factor: f64, rng: &mut R) -> Option<&str> {
		let weights = self.weights(smoothing, smoothing_factor);
		if weights.is_empty() {
			return None;
		}

		let total: f64 = weights.iter().map(|(_, weight)| weight).sum();
		if !(total.is_finite() && total > 0.0) {
			let index = rng.random_range(0..weights.len());
			return Some(weights[index].0);
		}

		let mut r = rng.random::<f64>() * total;

		let mut fallback = None;
		for (word, weight) in weights {
			if r < weight {
				return Some(word);
			}
			r -= weight;
			fallback = Some(word);
		}

		// Rounding can leave `r` just above the last bucket.
		fallback
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same context. Transition counts and
	/// totals are summed.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.key != other.key {
			return Err(ModelError::InvalidParameter(format!(
				"cannot merge state {} into {}",
				other.key, self.key
			)));
		}

		for (next_word, occurrence) in &other.transitions {
			*self.transitions.entry(next_word.clone()).or_insert(0) += *occurrence;
		}
		self.total += other.total;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn state(words: &[&str], continuations: &[&str]) -> State {
		let mut state = State::new(Context::new(words.iter().map(|w| w.to_string()).collect()));
		for next_word in continuations {
			state.add_transition(next_word);
			state.add_total(1);
		}
		state
	}

	#[test]
	fn counts_transitions() {
		let state = state(&["the"], &["cat", "dog", "cat"]);
		assert_eq!(state.count("cat"), 2);
		assert_eq!(state.count("dog"), 1);
		assert_eq!(state.count("cow"), 0);
		assert_eq!(state.distinct(), 2);
		assert_eq!(state.total(), 3);
	}

	#[test]
	fn predict_only_returns_known_continuations() {
		let state = state(&["the"], &["cat", "dog", "cat", "owl"]);
		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..200 {
			let word = state.predict(Smoothing::Interpolated, 1.0, &mut rng).unwrap();
			assert!(["cat", "dog", "owl"].contains(&word));
		}
	}

	#[test]
	fn predict_on_empty_state_is_none() {
		let state = state(&["the"], &[]);
		let mut rng = StdRng::seed_from_u64(7);
		assert_eq!(state.predict(Smoothing::Interpolated, 1.0, &mut rng), None);
	}

	#[test]
	fn all_zero_weights_fall_back_to_uniform() {
		// Every count equals k, so absolute discounting zeroes all weights.
		let state = state(&["a"], &["x", "y", "z"]);
		assert!(state.weights(Smoothing::AbsoluteDiscount, 1.0).iter().all(|(_, w)| *w == 0.0));

		let mut rng = StdRng::seed_from_u64(11);
		let mut seen = std::collections::BTreeSet::new();
		for _ in 0..300 {
			seen.insert(state.predict(Smoothing::AbsoluteDiscount, 1.0, &mut rng).unwrap());
		}
		assert_eq!(seen.len(), 3);
	}

	#[test]
	fn zero_weight_candidate_is_never_drawn_when_others_are_positive() {
		let mut state = state(&["a"], &["rare"]);
		for _ in 0..5 {
			state.add_transition("common");
			state.add_total(1);
		}
		let mut rng = StdRng::seed_from_u64(3);
		for _ in 0..200 {
			assert_eq!(state.predict(Smoothing::AbsoluteDiscount, 1.0, &mut rng), Some("common"));
		}
	}

	#[test]
	fn merge_sums_counts_and_totals() {
		let mut left = state(&["a"], &["x", "y"]);
		let right = state(&["a"], &["x", "z"]);
		left.merge(&right).unwrap();
		assert_eq!(left.count("x"), 2);
		assert_eq!(left.count("z"), 1);
		assert_eq!(left.total(), 4);
	}

	#[test]
	fn merge_rejects_other_key() {
		let mut left = state(&["a"], &["x"]);
		let right = state(&["b"], &["x"]);
		assert!(left.merge(&right).is_err());
	}
}
