use std::borrow::Borrow;
use std::fmt;

/// An ordered tuple of `n-1` consecutive tokens.
///
/// Two contexts are equal iff their tokens are equal element-wise and in
/// order. `Context` borrows as `[String]` so tables keyed by it can be
/// queried with a plain token slice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Context(Vec<String>);

impl Context {
	pub fn new(tokens: Vec<String>) -> Self {
		Self(tokens)
	}

	pub fn tokens(&self) -> &[String] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<&[String]> for Context {
	fn from(tokens: &[String]) -> Self {
		Self(tokens.to_vec())
	}
}

impl Borrow<[String]> for Context {
	fn borrow(&self) -> &[String] {
		&self.0
	}
}

impl fmt::Display for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({})", self.0.join(" "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn tokens(words: &[&str]) -> Vec<String> {
		words.iter().map(|w| w.to_string()).collect()
	}

	#[test]
	fn equality_is_ordered() {
		assert_eq!(Context::new(tokens(&["a", "b"])), Context::new(tokens(&["a", "b"])));
		assert_ne!(Context::new(tokens(&["a", "b"])), Context::new(tokens(&["b", "a"])));
	}

	#[test]
	fn map_lookup_by_slice() {
		let mut map = HashMap::new();
		map.insert(Context::new(tokens(&["x", "y"])), 3);
		let key = tokens(&["x", "y"]);
		assert_eq!(map.get(key.as_slice()), Some(&3));
		assert_eq!(map.get(&key[..1]), None);
	}

	#[test]
	fn displays_tokens() {
		assert_eq!(Context::new(tokens(&["good", "day"])).to_string(), "(good day)");
	}
}
