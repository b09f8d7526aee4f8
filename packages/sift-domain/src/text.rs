use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

const SEPARATORS: [char; 13] = [',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\''];

/// NFKC-folds and lowercases the input.
pub fn normalize(input: &str) -> String {
	input.nfkc().collect::<String>().to_lowercase()
}

/// Splits normalized text into word tokens.
///
/// Separators are whitespace and common punctuation. Trailing periods are trimmed so sentence ends
/// do not stick to words, while inner symbols survive: `c#`, `node.js`, `ci/cd`, and `5+` all stay
/// whole.
pub fn tokenize(input: &str) -> Vec<String> {
	normalize(input)
		.split(|ch: char| ch.is_whitespace() || SEPARATORS.contains(&ch))
		.map(|token| token.trim_end_matches('.'))
		.filter(|token| !token.is_empty())
		.map(str::to_string)
		.collect()
}

/// Tokenized text with word and phrase lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens(Vec<String>);
impl Tokens {
	pub fn new(input: &str) -> Self {
		Self(tokenize(input))
	}

	pub fn as_slice(&self) -> &[String] {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// True when every token of `term` appears contiguously, so `ms` never matches inside
	/// `systems` and `machine learning` needs both words in order.
	pub fn contains_term(&self, term: &str) -> bool {
		let needle = tokenize(term);

		if needle.is_empty() {
			return false;
		}

		self.0.windows(needle.len()).any(|window| window == needle.as_slice())
	}

	pub fn contains_any(&self, terms: &[&str]) -> bool {
		terms.iter().any(|term| self.contains_term(term))
	}

	/// Number of distinct entries of `terms` present.
	pub fn count_terms(&self, terms: &[&str]) -> usize {
		terms.iter().filter(|term| self.contains_term(term)).count()
	}

	pub fn word_set(&self) -> HashSet<&str> {
		self.0.iter().map(String::as_str).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokenize_keeps_technical_symbols() {
		assert_eq!(
			tokenize("Senior C# / Node.js dev, CI/CD; 5+ years."),
			vec!["senior", "c#", "/", "node.js", "dev", "ci/cd", "5+", "years"]
		);
	}

	#[test]
	fn tokenize_folds_compatibility_forms() {
		assert_eq!(tokenize("ＰＹＴＨＯＮ"), vec!["python"]);
	}

	#[test]
	fn phrase_match_respects_word_boundaries() {
		let tokens = Tokens::new("Distributed systems with machine learning.");

		assert!(!tokens.contains_term("ms"));
		assert!(tokens.contains_term("machine learning"));
		assert!(!tokens.contains_term("learning machine"));
		assert!(!tokens.contains_term(""));
	}

	#[test]
	fn count_terms_counts_distinct_entries() {
		let tokens = Tokens::new("python python aws");

		assert_eq!(tokens.count_terms(&["python", "aws", "gcp"]), 2);
	}
}
