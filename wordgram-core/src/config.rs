use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Estimator used to weight candidate continuations.
///
/// With `c` the n-gram count, `C` the context total, `D` the number of
/// distinct continuations and `k` the smoothing factor:
/// - `Interpolated`: `max(c - k, 0) / C + (k / C) * D`
/// - `AbsoluteDiscount`: `max(c - k, 0) / C`
/// - `Laplace`: `(c + k) / (C + D * k)`
///
/// None of these are required to sum to 1 over a context; they are only
/// used as relative sampling weights.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
	#[default]
	Interpolated,
	AbsoluteDiscount,
	Laplace,
}

/// How context totals are accumulated during training.
///
/// `Legacy` increments a context total a second time for every window that
/// is not the last one of its token stream, so a total can exceed the sum of
/// its next-word counts. `Strict` keeps the total equal to that sum.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContextTotals {
	#[default]
	Legacy,
	Strict,
}

/// What happens to the seed when generation starts.
///
/// - `DropLast`: the output starts as the seed without its final token.
/// - `KeepAll`: the whole seed is kept in the output; its trailing `n-1`
///   tokens form the first context.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeedHandling {
	#[default]
	DropLast,
	KeepAll,
}

impl FromStr for Smoothing {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.to_lowercase().replace('-', "_").as_str() {
			"interpolated" => Ok(Smoothing::Interpolated),
			"absolute_discount" => Ok(Smoothing::AbsoluteDiscount),
			"laplace" => Ok(Smoothing::Laplace),
			other => Err(format!("unknown smoothing '{other}', expected interpolated, absolute-discount or laplace")),
		}
	}
}

impl FromStr for ContextTotals {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"legacy" => Ok(ContextTotals::Legacy),
			"strict" => Ok(ContextTotals::Strict),
			other => Err(format!("unknown context total mode '{other}', expected legacy or strict")),
		}
	}
}

impl FromStr for SeedHandling {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.to_lowercase().replace('-', "_").as_str() {
			"drop_last" => Ok(SeedHandling::DropLast),
			"keep_all" => Ok(SeedHandling::KeepAll),
			other => Err(format!("unknown seed handling '{other}', expected drop-last or keep-all")),
		}
	}
}

/// Construction parameters of an `NGramModel`.
///
/// # Invariants
/// - `n >= 2`
/// - `smoothing_factor` is finite and strictly positive
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
	/// Order of the model (context length is `n - 1`).
	pub n: usize,

	/// Discount / pseudo-count constant `k`.
	pub smoothing_factor: f64,

	pub smoothing: Smoothing,

	pub context_totals: ContextTotals,
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self {
			n: 2,
			smoothing_factor: 1.0,
			smoothing: Smoothing::default(),
			context_totals: ContextTotals::default(),
		}
	}
}

impl ModelConfig {
	/// Default configuration with a custom order.
	pub fn with_order(n: usize) -> Self {
		Self { n, ..Self::default() }
	}

	/// Checks the invariants listed on the struct.
	///
	/// # Errors
	/// `InvalidOrder` if `n < 2`, `InvalidParameter` for a bad smoothing factor.
	pub fn validate(&self) -> Result<()> {
		if self.n < 2 {
			return Err(ModelError::InvalidOrder(self.n));
		}
		if !self.smoothing_factor.is_finite() || self.smoothing_factor <= 0.0 {
			return Err(ModelError::InvalidParameter(format!(
				"smoothing factor must be a positive number, got {}",
				self.smoothing_factor
			)));
		}
		Ok(())
	}
}

/// Parameters of a single generation request.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
	/// Generation budget is `seed.len() * length_factor` word-steps.
	length_factor: usize,

	pub seed_handling: SeedHandling,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self { length_factor: 8, seed_handling: SeedHandling::default() }
	}
}

impl GenerationConfig {
	/// Returns the current length multiplier.
	pub fn length_factor(&self) -> usize {
		self.length_factor
	}

	/// Sets the length multiplier.
	///
	/// # Errors
	/// Returns an error if `length_factor` is zero.
	pub fn set_length_factor(&mut self, length_factor: usize) -> Result<()> {
		if length_factor == 0 {
			return Err(ModelError::InvalidParameter("length factor must be >= 1".to_owned()));
		}
		self.length_factor = length_factor;
		Ok(())
	}

	/// Builder-style variant of `set_length_factor`.
	pub fn with_length_factor(mut self, length_factor: usize) -> Result<Self> {
		self.set_length_factor(length_factor)?;
		Ok(self)
	}

	pub fn with_seed_handling(mut self, seed_handling: SeedHandling) -> Self {
		self.seed_handling = seed_handling;
		self
	}

	pub(crate) fn validate(&self) -> Result<()> {
		if self.length_factor == 0 {
			return Err(ModelError::InvalidParameter("length factor must be >= 1".to_owned()));
		}
		Ok(())
	}
}
