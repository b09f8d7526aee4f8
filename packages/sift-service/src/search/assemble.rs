use unicode_segmentation::UnicodeSegmentation;

use sift_domain::{
	taxonomy::{QUERY_VERBS, STOP_WORDS},
	text::{self, Tokens},
};

const ELLIPSIS: &str = "...";

/// Query words worth looking for in resume text.
pub(crate) fn snippet_terms(query: &str) -> Vec<String> {
	let mut terms: Vec<String> = Vec::new();

	for token in text::tokenize(query) {
		if STOP_WORDS.contains(&token.as_str())
			|| QUERY_VERBS.contains(&token.as_str())
			|| terms.contains(&token)
		{
			continue;
		}

		terms.push(token);
	}

	terms
}

/// Sentences of `full_text` that mention a query term, joined with ". " and capped at
/// `max_chars` graphemes. Falls back to the start of the text when nothing matches.
pub(crate) fn relevant_text(full_text: &str, terms: &[String], max_chars: usize) -> String {
	let full_text = full_text.trim();

	if full_text.is_empty() {
		return String::new();
	}

	let matched: Vec<&str> = full_text
		.split('.')
		.map(str::trim)
		.filter(|sentence| !sentence.is_empty())
		.filter(|sentence| {
			let tokens = Tokens::new(sentence);

			terms.iter().any(|term| tokens.contains_term(term))
		})
		.collect();

	if matched.is_empty() {
		return truncate_graphemes(full_text, max_chars);
	}

	truncate_graphemes(&matched.join(". "), max_chars)
}

fn truncate_graphemes(text: &str, max_chars: usize) -> String {
	match text.grapheme_indices(true).nth(max_chars) {
		Some((cut, _)) => format!("{}{ELLIPSIS}", text[..cut].trim_end()),
		None => text.to_string(),
	}
}
