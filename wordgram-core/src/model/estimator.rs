use crate::config::Smoothing;

impl Smoothing {
	/// Smoothed likelihood weight of one continuation.
	///
	/// - `ngram_count`: times the continuation followed the context
	/// - `context_count`: the context total
	/// - `distinct`: number of distinct continuations of the context
	/// - `k`: smoothing factor
	///
	/// Returns `None` when the weight is undefined (no occurrences and no
	/// continuations).
	pub fn weight(self, ngram_count: usize, context_count: usize, distinct: usize, k: f64) -> Option<f64> {
		let c = ngram_count as f64;
		let d = distinct as f64;

		if context_count > 0 {
			let total = context_count as f64;
			let discounted = (c - k).max(0.0);
			let weight = match self {
				Smoothing::Interpolated => discounted / total + (k / total) * d,
				Smoothing::AbsoluteDiscount => discounted / total,
				Smoothing::Laplace => (c + k) / (total + d * k),
			};
			Some(weight)
		} else if distinct > 0 {
			Some(1.0 / d)
		} else {
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPS: f64 = 1e-12;

	#[test]
	fn interpolated_matches_formula() {
		// max(3 - 1, 0) / 4 + (1 / 4) * 2
		let w = Smoothing::Interpolated.weight(3, 4, 2, 1.0).unwrap();
		assert!((w - 1.0).abs() < EPS);
	}

	#[test]
	fn interpolated_keeps_reserved_mass_for_single_counts() {
		let w = Smoothing::Interpolated.weight(1, 2, 2, 1.0).unwrap();
		assert!((w - 1.0).abs() < EPS);
	}

	#[test]
	fn absolute_discount_can_reach_zero() {
		assert_eq!(Smoothing::AbsoluteDiscount.weight(1, 3, 2, 1.0), Some(0.0));
		let w = Smoothing::AbsoluteDiscount.weight(5, 10, 3, 0.5).unwrap();
		assert!((w - 0.45).abs() < EPS);
	}

	#[test]
	fn laplace_matches_formula() {
		// (2 + 1) / (4 + 3 * 1)
		let w = Smoothing::Laplace.weight(2, 4, 3, 1.0).unwrap();
		assert!((w - 3.0 / 7.0).abs() < EPS);
	}

	#[test]
	fn unseen_context_with_continuations_is_uniform() {
		for smoothing in [Smoothing::Interpolated, Smoothing::AbsoluteDiscount, Smoothing::Laplace] {
			assert_eq!(smoothing.weight(0, 0, 4, 1.0), Some(0.25));
		}
	}

	#[test]
	fn fully_unseen_context_is_undefined() {
		for smoothing in [Smoothing::Interpolated, Smoothing::AbsoluteDiscount, Smoothing::Laplace] {
			assert_eq!(smoothing.weight(0, 0, 0, 1.0), None);
		}
	}
}
