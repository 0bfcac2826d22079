use rand::Rng;
use serde::Serialize;

use super::ngram_model::NGramModel;
use crate::config::{GenerationConfig, SeedHandling};
use crate::error::{ModelError, Result};
use crate::tokenizer::is_sentence_terminal;

/// Terminal state of a generation run. None of them is an error.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
	/// The last sampled token ends with `.`, `!` or `?`.
	SentenceTerminated,
	/// The current context has no recorded continuation.
	Exhausted,
	/// The word-step budget was used up.
	LengthCapped,
}

/// Output of a generation run.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Generation {
	pub tokens: Vec<String>,
	pub stop: StopReason,
}

impl Generation {
	/// Tokens joined with single spaces.
	pub fn text(&self) -> String {
		self.tokens.join(" ")
	}
}

impl NGramModel {
	/// Generates a token sequence from `seed`.
	///
	/// # Behavior
	/// - The budget is `seed.len() * length_factor` word-steps.
	/// - The output starts as the seed, minus its last token with
	///   `SeedHandling::DropLast`.
	/// - Each step takes the last `n-1` output tokens (or all of them if
	///   fewer) as the context, weights every known continuation with the
	///   model's estimator and samples one of them.
	/// - Stops after a sentence-terminal token, when the context has no
	///   continuation, or when the budget is spent.
	///
	/// Only contexts present in the model are ever weighted, so this never
	/// hits `UndefinedContext`. A shorter-than-`n-1` context never matches a
	/// stored one and ends the run as `Exhausted`.
	///
	/// # Errors
	/// `InsufficientSeed` if the seed has fewer than `n-1` tokens,
	/// `InvalidParameter` for an invalid configuration or a budget that does
	/// not fit in `usize`.
	pub fn generate<S, R>(&self, seed: &[S], config: &GenerationConfig, rng: &mut R) -> Result<Generation>
	where
		S: AsRef<str>,
		R: Rng,
	{
		config.validate()?;

		let context_len = self.n() - 1;
		if seed.len() < context_len {
			return Err(ModelError::InsufficientSeed { expected: context_len, got: seed.len() });
		}

		let max_length = seed.len().checked_mul(config.length_factor()).ok_or_else(|| {
			ModelError::InvalidParameter(format!(
				"budget of {} seed token(s) times length factor {} overflows",
				seed.len(),
				config.length_factor()
			))
		})?;
		let mut tokens: Vec<String> = seed.iter().map(|s| s.as_ref().to_owned()).collect();
		if config.seed_handling == SeedHandling::DropLast {
			tokens.pop();
		}

		let smoothing = self.config().smoothing;
		let smoothing_factor = self.config().smoothing_factor;

		let mut stop = StopReason::LengthCapped;
		for _ in 0..max_length {
			let start = tokens.len().saturating_sub(context_len);
			let next_word = self
				.state(&tokens[start..])
				.and_then(|state| state.predict(smoothing, smoothing_factor, rng))
				.map(str::to_owned);

			let Some(next_word) = next_word else {
				stop = StopReason::Exhausted;
				break;
			};

			let terminal = is_sentence_terminal(&next_word);
			tokens.push(next_word);
			if terminal {
				stop = StopReason::SentenceTerminated;
				break;
			}
		}

		log::debug!("Generation stopped ({:?}) with {} token(s)", stop, tokens.len());
		Ok(Generation { tokens, stop })
	}

	/// Generates text from `seed` with the default generation settings.
	///
	/// # Errors
	/// See `generate`.
	pub fn generate_text<S, R>(&self, seed: &[S], rng: &mut R) -> Result<String>
	where
		S: AsRef<str>,
		R: Rng,
	{
		Ok(self.generate(seed, &GenerationConfig::default(), rng)?.text())
	}
}

/// High-level generator over a trained, read-only model.
///
/// Owns its random source, so several generators can sample from the same
/// model concurrently without correlated outputs.
#[derive(Debug)]
pub struct Generator<'m, R: Rng> {
	model: &'m NGramModel,
	config: GenerationConfig,
	rng: R,
}

impl<'m, R: Rng> Generator<'m, R> {
	/// Creates a generator.
	///
	/// # Errors
	/// Returns an error if the configuration is invalid.
	pub fn new(model: &'m NGramModel, config: GenerationConfig, rng: R) -> Result<Self> {
		config.validate()?;
		if !model.is_trained() {
			log::warn!("Generating from an untrained model: every run will end immediately");
		}
		Ok(Self { model, config, rng })
	}

	pub fn config(&self) -> &GenerationConfig {
		&self.config
	}

	pub fn config_mut(&mut self) -> &mut GenerationConfig {
		&mut self.config
	}

	/// Generates a sequence from `seed` and reports why it stopped.
	pub fn generate<S: AsRef<str>>(&mut self, seed: &[S]) -> Result<Generation> {
		self.model.generate(seed, &self.config, &mut self.rng)
	}

	/// Generates a space-joined string from `seed`.
	pub fn generate_text<S: AsRef<str>>(&mut self, seed: &[S]) -> Result<String> {
		Ok(self.generate(seed)?.text())
	}
}
