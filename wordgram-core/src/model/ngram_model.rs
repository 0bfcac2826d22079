use std::collections::{BTreeSet, HashMap};
use std::sync::mpsc;
use std::thread;

use serde::Serialize;
use serde_json::Value;

use super::context::Context;
use super::state::State;
use crate::config::{ContextTotals, ModelConfig};
use crate::corpus::Record;
use crate::error::{ModelError, Result};
use crate::tokenizer::Tokenizer;

/// Represents a word n-gram model.
///
/// The `NGramModel` stores one state per context of `n-1` tokens and
/// weights continuations with a smoothed estimator when generating.
///
/// # Responsibilities
/// - Tokenize titled records and accumulate (context → next word) counts
/// - Keep the per-context totals used by the estimator
/// - Answer probability queries for any (context, candidate) pair
/// - Merge with another model of the same order `n`
///
/// # Invariants
/// - `n` is always >= 2
/// - Each state in `states` corresponds to a unique context of length `n-1`
/// - Tables are only mutated by training, merging and `reset`
///
/// Training never resets: calling `train` again adds to the existing counts.
#[derive(Clone, Debug)]
pub struct NGramModel {
	config: ModelConfig,

	tokenizer: Tokenizer,

	/// Mapping from a context to its corresponding state
	states: HashMap<Context, State>,
}

/// Summary of a trained model.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelStats {
	pub n: usize,
	/// Number of distinct contexts.
	pub contexts: usize,
	/// Number of n-grams observed (sum of all next-word counts).
	pub ngrams: usize,
	/// Number of distinct tokens seen in contexts or continuations.
	pub vocabulary: usize,
}

impl NGramModel {
	/// Creates a new, empty model of order `n` with default smoothing.
	///
	/// # Errors
	/// Returns an error if `n < 2`.
	pub fn new(n: usize) -> Result<Self> {
		Self::with_config(ModelConfig::with_order(n))
	}

	/// Creates a new, empty model from a full configuration.
	///
	/// # Errors
	/// Returns an error if the configuration is invalid.
	pub fn with_config(config: ModelConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self { config, tokenizer: Tokenizer::default(), states: HashMap::new() })
	}

	/// Replaces the tokenizer applied to records.
	pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
		self.tokenizer = tokenizer;
		self
	}

	pub fn n(&self) -> usize {
		self.config.n
	}

	pub fn config(&self) -> &ModelConfig {
		&self.config
	}

	pub fn tokenizer(&self) -> &Tokenizer {
		&self.tokenizer
	}

	/// Returns whether at least one n-gram has been recorded.
	pub fn is_trained(&self) -> bool {
		!self.states.is_empty()
	}

	/// Empties both tables, keeping the configuration.
	pub fn reset(&mut self) {
		self.states.clear();
	}

	/// Empty model sharing this model's configuration and tokenizer.
	fn empty_like(&self) -> Self {
		Self { config: self.config, tokenizer: self.tokenizer, states: HashMap::new() }
	}

	/// Title tokens followed by content tokens, with no boundary marker.
	fn record_tokens(&self, record: &Record) -> Vec<String> {
		let mut words = self.tokenizer.tokenize(&record.title);
		words.extend(self.tokenizer.tokenize(&record.content));
		words
	}

	/// Accumulates counts from every record, returning the number of n-grams seen.
	fn accumulate(&mut self, records: &[Record]) -> usize {
		let mut ngrams = 0;
		for record in records {
			let words = self.record_tokens(record);
			ngrams += self.train_tokens(&words);
		}
		ngrams
	}

	/// Trains the model on a sequence of records.
	///
	/// Records with fewer than `n` tokens contribute nothing.
	pub fn train(&mut self, records: &[Record]) {
		let ngrams = self.accumulate(records);
		log::info!(
			"Trained on {} record(s): {} n-gram(s), {} context(s) in total",
			records.len(),
			ngrams,
			self.states.len()
		);
	}

	/// Trains the model on raw JSON records.
	///
	/// Every record is validated before any count is touched, so a malformed
	/// record leaves the model unchanged.
	///
	/// # Errors
	/// `MalformedRecord` for the first record that is not a `{title, content}` object.
	pub fn train_json(&mut self, values: &[Value]) -> Result<()> {
		let records = values
			.iter()
			.enumerate()
			.map(|(index, value)| Record::from_value(index, value))
			.collect::<Result<Vec<_>>>()?;
		self.train(&records);
		Ok(())
	}

	/// Accumulates the n-grams of one token stream.
	///
	/// Slides a window of width `n` across `words`; for every window the
	/// first `n-1` tokens form the context and the last one the next word.
	/// Returns the number of windows.
	///
	/// With `ContextTotals::Legacy`, a window that is not the last one of the
	/// stream increments its context total twice.
	pub fn train_tokens(&mut self, words: &[String]) -> usize {
		let n = self.config.n;
		if words.len() < n {
			log::debug!("Skipping token stream of length {} (< n = {})", words.len(), n);
			return 0;
		}
		let legacy = self.config.context_totals == ContextTotals::Legacy;

		// For each n-gram in the stream
		for i in 0..=words.len() - n {
			let context = &words[i..i + n - 1];
			let next_word = &words[i + n - 1];

			// Get or create the state for this context
			let state = self
				.states
				.entry(Context::from(context))
				.or_insert_with_key(|key| State::new(key.clone()));
			state.add_transition(next_word);
			state.add_total(1);

			if legacy && i + n - 1 < words.len() - 1 {
				state.add_total(1);
			}
		}

		words.len() - n + 1
	}

	/// Trains on `records` using worker threads, then merges the partial models.
	///
	/// Records are split into `cpus * 8` chunks. The result is identical to
	/// calling `train` with the same records.
	///
	/// # Errors
	/// Returns an error if partial models cannot be merged.
	pub fn train_parallel(&mut self, records: &[Record]) -> Result<()> {
		if records.is_empty() {
			return Ok(());
		}

		let chunks = num_cpus::get() * 8;
		let chunk_size = records.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk in records.chunks(chunk_size) {
				let tx = tx.clone();
				let mut partial_model = self.empty_like();

				scope.spawn(move || {
					let ngrams = partial_model.accumulate(chunk);
					if tx.send((partial_model, ngrams)).is_err() {
						log::error!("Training worker could not hand back its partial model");
					}
				});
			}
		});
		drop(tx);

		let mut ngrams = 0;
		for (partial_model, partial_ngrams) in rx.iter() {
			self.merge(&partial_model)?;
			ngrams += partial_ngrams;
		}

		log::info!(
			"Trained on {} record(s) in {} chunk(s): {} n-gram(s), {} context(s) in total",
			records.len(),
			records.len().div_ceil(chunk_size),
			ngrams,
			self.states.len()
		);
		Ok(())
	}

	/// Merges another n-gram model into this one.
	///
	/// # Notes
	/// - Both models must have the same order `n` and context total mode.
	/// - Occurrence counts and context totals are summed.
	///
	/// # Errors
	/// Returns an error if the models are incompatible.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.config.n != other.config.n {
			return Err(ModelError::InvalidParameter(format!(
				"N mismatch: {} vs {}",
				self.config.n, other.config.n
			)));
		}
		if self.config.context_totals != other.config.context_totals {
			return Err(ModelError::InvalidParameter("context total mode mismatch".to_owned()));
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}

	pub(crate) fn state(&self, context: &[String]) -> Option<&State> {
		self.states.get(context)
	}

	/// Occurrences of `next_word` after `context`.
	///
	/// `None` if the context was never seen, `Some(0)` if it was seen but
	/// never followed by `next_word`.
	pub fn frequency(&self, context: &[String], next_word: &str) -> Option<usize> {
		self.state(context).map(|state| state.count(next_word))
	}

	/// Context total, zero for an unseen context.
	pub fn context_total(&self, context: &[String]) -> usize {
		self.state(context).map_or(0, State::total)
	}

	/// Number of distinct continuations, zero for an unseen context.
	pub fn distinct_continuations(&self, context: &[String]) -> usize {
		self.state(context).map_or(0, State::distinct)
	}

	/// Continuations of `context` with their counts, in token order.
	///
	/// Returns `None` if the context was never seen.
	pub fn candidates(&self, context: &[String]) -> Option<Vec<(&str, usize)>> {
		self.state(context).map(|state| state.transitions().collect())
	}

	/// Smoothed likelihood weight of `next_word` following `context`.
	///
	/// The weight is relative: weights of one context are not required to sum to 1.
	///
	/// # Errors
	/// `UndefinedContext` if the context has no occurrences and no continuations.
	pub fn calculate_probability(&self, context: &[String], next_word: &str) -> Result<f64> {
		let (ngram_count, context_count, distinct) = match self.state(context) {
			Some(state) => (state.count(next_word), state.total(), state.distinct()),
			None => (0, 0, 0),
		};

		self.config
			.smoothing
			.weight(ngram_count, context_count, distinct, self.config.smoothing_factor)
			.ok_or_else(|| ModelError::UndefinedContext { context: context.to_vec() })
	}

	pub fn stats(&self) -> ModelStats {
		let mut vocabulary: BTreeSet<&str> = BTreeSet::new();
		let mut ngrams = 0;
		for (key, state) in &self.states {
			vocabulary.extend(key.tokens().iter().map(String::as_str));
			for (word, occurrence) in state.transitions() {
				vocabulary.insert(word);
				ngrams += occurrence;
			}
		}

		ModelStats { n: self.config.n, contexts: self.states.len(), ngrams, vocabulary: vocabulary.len() }
	}
}
