use crate::{
	taxonomy::{SENIORITY_SYNONYMS, SKILL_SYNONYMS, SynonymEntry},
	text::Tokens,
};

const RELATED_TERMS_PER_ENTRY: usize = 3;

/// Appends canonical names and related terms for every synonym entry the query mentions.
///
/// Each triggered entry contributes its canonical name plus at most three synonyms. Terms already
/// in the query, or already appended, are skipped, so re-expanding an expanded query adds nothing
/// for entries it has already triggered.
pub fn expand_query(query: &str) -> String {
	let tokens = Tokens::new(query);

	if tokens.is_empty() {
		return query.trim().to_string();
	}

	let mut appended: Vec<&'static str> = Vec::new();

	for entry in SKILL_SYNONYMS.iter().chain(SENIORITY_SYNONYMS.iter()) {
		if !tokens.contains_any(entry.synonyms) {
			continue;
		}

		for term in entry_terms(entry) {
			if tokens.contains_term(term) || appended.contains(&term) {
				continue;
			}

			appended.push(term);
		}
	}

	let mut expanded = query.trim().to_string();

	for term in appended {
		expanded.push(' ');
		expanded.push_str(term);
	}

	expanded
}

fn entry_terms(entry: &SynonymEntry) -> impl Iterator<Item = &'static str> + '_ {
	std::iter::once(entry.canonical)
		.chain(entry.synonyms.iter().take(RELATED_TERMS_PER_ENTRY).copied())
}
