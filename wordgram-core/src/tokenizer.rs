//! Text normalization into word tokens.
//!
//! Text is lowercased, every character outside the fixed alphabet is removed,
//! and the remainder is split on whitespace runs.

/// Extended letters accepted besides ASCII `a-z`.
pub const EXTENDED_LETTERS: [char; 6] = ['ğ', 'ü', 'ş', 'ı', 'ö', 'ç'];

/// Characters that mark the end of a sentence when they end a token.
pub const SENTENCE_TERMINALS: [char; 3] = ['.', '!', '?'];

/// Splits raw text into lowercase tokens over a fixed alphabet.
///
/// The default tokenizer drops all punctuation, so no token it produces can
/// end in a sentence terminal. `keep_sentence_terminals` lets `.`, `!` and
/// `?` through so that generation can stop on sentence boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tokenizer {
	pub keep_sentence_terminals: bool,
}

impl Tokenizer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Tokenizer that also keeps `.`, `!` and `?`.
	pub fn with_sentence_terminals() -> Self {
		Self { keep_sentence_terminals: true }
	}

	/// Returns whether `c` survives filtering (after lowercasing).
	fn is_allowed(&self, c: char) -> bool {
		c.is_ascii_lowercase()
			|| is_separator(c)
			|| EXTENDED_LETTERS.contains(&c)
			|| (self.keep_sentence_terminals && SENTENCE_TERMINALS.contains(&c))
	}

	/// Normalizes `text` into an ordered sequence of tokens.
	///
	/// Pure function of its input; returns an empty vector when no valid
	/// characters remain.
	pub fn tokenize(&self, text: &str) -> Vec<String> {
		let filtered: String = text
			.chars()
			.flat_map(char::to_lowercase)
			.filter(|c| self.is_allowed(*c))
			.collect();

		filtered.split(is_separator).filter(|t| !t.is_empty()).map(str::to_owned).collect()
	}
}

/// Unicode whitespace plus the ASCII file, group, record and unit separators.
fn is_separator(c: char) -> bool {
	c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Tokenizes with the default alphabet.
pub fn tokenize(text: &str) -> Vec<String> {
	Tokenizer::default().tokenize(text)
}

/// Returns whether `token` ends with `.`, `!` or `?`.
pub fn is_sentence_terminal(token: &str) -> bool {
	token.ends_with(&SENTENCE_TERMINALS[..])
}
