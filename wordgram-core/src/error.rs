use thiserror::Error;

/// Errors raised by training, probability queries and generation.
///
/// Nothing in the crate swallows these: every variant reaches the caller of
/// `train` / `calculate_probability` / `generate`.
#[derive(Debug, Error)]
pub enum ModelError {
	/// A corpus record is missing `title` or `content`, or holds a value
	/// that has no textual form.
	#[error("malformed record #{index}: {reason}")]
	MalformedRecord { index: usize, reason: String },

	/// Probability requested for a context with no recorded occurrences
	/// and no distinct continuations.
	#[error("undefined context {context:?}: no occurrences and no continuations")]
	UndefinedContext { context: Vec<String> },

	/// The seed does not hold enough tokens to form one context.
	#[error("seed too short: expected at least {expected} token(s), got {got}")]
	InsufficientSeed { expected: usize, got: usize },

	#[error("n must be >= 2, got {0}")]
	InvalidOrder(usize),

	#[error("invalid parameter: {0}")]
	InvalidParameter(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
