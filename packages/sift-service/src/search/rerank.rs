use std::{
	cmp::Ordering,
	collections::{HashMap, hash_map::Entry},
	sync::LazyLock,
};

use regex::Regex;
use serde_json::{Map, Value};

use sift_config::Rerank;
use sift_domain::{taxonomy::SKILL_SYNONYMS, text::Tokens};

use crate::search::{retrieval::RawHit, strategy::VariantKind};

static SNIPPET_YEARS_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(\d+)\+?\s*years?").ok());

/// Hits for one candidate collapsed to the best similarity seen.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PooledCandidate {
	pub(crate) candidate_id: String,
	pub(crate) max_similarity: f32,
	/// Variants that surfaced the candidate, in first-seen order.
	pub(crate) variants: Vec<VariantKind>,
	/// Payload of the best-scoring hit.
	pub(crate) metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RerankSignals {
	pub(crate) alignment: f64,
	pub(crate) recency: f64,
	/// Unbounded; ordering uses it as is.
	pub(crate) score: f64,
}

/// Groups hits by candidate keeping the maximum score, ordered by similarity then id.
pub(crate) fn dedup(hits: Vec<RawHit>) -> Vec<PooledCandidate> {
	let mut pooled: HashMap<String, PooledCandidate> = HashMap::new();

	for hit in hits {
		match pooled.entry(hit.candidate_id) {
			Entry::Occupied(mut slot) => {
				let candidate = slot.get_mut();

				if hit.score > candidate.max_similarity {
					candidate.max_similarity = hit.score;
					candidate.metadata = hit.metadata;
				}

				if !candidate.variants.contains(&hit.variant) {
					candidate.variants.push(hit.variant);
				}
			},
			Entry::Vacant(slot) => {
				let candidate_id = slot.key().clone();

				slot.insert(PooledCandidate {
					candidate_id,
					max_similarity: hit.score,
					variants: vec![hit.variant],
					metadata: hit.metadata,
				});
			},
		}
	}

	let mut pooled: Vec<PooledCandidate> = pooled.into_values().collect();

	pooled.sort_by(|a, b| {
		b.max_similarity
			.total_cmp(&a.max_similarity)
			.then_with(|| a.candidate_id.cmp(&b.candidate_id))
	});

	pooled
}

pub(crate) fn signals(
	cfg: &Rerank,
	max_similarity: f32,
	query_skill_terms: &[String],
	candidate_skills: &[String],
	query_years: Option<u32>,
	snippet: &str,
) -> RerankSignals {
	let alignment = alignment_bonus(query_skill_terms, candidate_skills);
	let recency = recency_bonus(cfg, query_years, snippet);
	let score = f64::from(max_similarity)
		+ cfg.alignment_weight * alignment
		+ cfg.recency_weight * recency;

	RerankSignals { alignment, recency, score }
}

/// Share of the query's skill terms that some candidate skill names through a synonym.
pub(crate) fn alignment_bonus(query_skill_terms: &[String], candidate_skills: &[String]) -> f64 {
	if query_skill_terms.is_empty() {
		return 0.0;
	}

	let skills: Vec<Tokens> = candidate_skills.iter().map(|skill| Tokens::new(skill)).collect();
	let aligned = query_skill_terms
		.iter()
		.filter(|term| {
			let synonyms = SKILL_SYNONYMS
				.iter()
				.find(|entry| entry.canonical == term.as_str())
				.map(|entry| entry.synonyms)
				.unwrap_or_default();

			skills.iter().any(|skill| {
				skill.contains_term(term) || synonyms.iter().any(|syn| skill.contains_term(syn))
			})
		})
		.count();

	aligned as f64 / query_skill_terms.len() as f64
}

pub(crate) fn recency_bonus(cfg: &Rerank, query_years: Option<u32>, snippet: &str) -> f64 {
	let Some(wanted) = query_years else {
		return 0.0;
	};
	let Some(found) = snippet_years(snippet) else {
		return 0.0;
	};
	let gap = wanted.abs_diff(found);

	if gap <= cfg.recency_close_years {
		1.0
	} else if gap <= cfg.recency_near_years {
		0.5
	} else {
		0.0
	}
}

/// Final order: score, then re-rank score, then candidate id.
pub(crate) fn compare_ranked(
	(a_final, a_rerank, a_id): (f64, f64, &str),
	(b_final, b_rerank, b_id): (f64, f64, &str),
) -> Ordering {
	b_final
		.total_cmp(&a_final)
		.then_with(|| b_rerank.total_cmp(&a_rerank))
		.then_with(|| a_id.cmp(b_id))
}

fn snippet_years(snippet: &str) -> Option<u32> {
	let re = SNIPPET_YEARS_RE.as_ref()?;
	let lowered = snippet.to_lowercase();

	re.captures(&lowered)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hit(id: &str, score: f32, variant: VariantKind) -> RawHit {
		RawHit { candidate_id: id.to_string(), score, metadata: Map::new(), variant }
	}

	#[test]
	fn dedup_keeps_the_maximum_score() {
		let pooled = dedup(vec![
			hit("a", 0.4, VariantKind::Base),
			hit("b", 0.6, VariantKind::Base),
			hit("a", 0.9, VariantKind::Role),
			hit("a", 0.7, VariantKind::SkillFocus),
		]);

		assert_eq!(pooled.len(), 2);
		assert_eq!(pooled[0].candidate_id, "a");
		assert_eq!(pooled[0].max_similarity, 0.9);
		assert_eq!(
			pooled[0].variants,
			vec![VariantKind::Base, VariantKind::Role, VariantKind::SkillFocus]
		);
	}

	#[test]
	fn dedup_breaks_similarity_ties_by_id() {
		let pooled = dedup(vec![hit("z", 0.5, VariantKind::Base), hit("m", 0.5, VariantKind::Base)]);
		let ids: Vec<&str> = pooled.iter().map(|item| item.candidate_id.as_str()).collect();

		assert_eq!(ids, vec!["m", "z"]);
	}

	#[test]
	fn alignment_counts_synonym_matches() {
		let query_terms = vec!["python".to_string(), "kubernetes".to_string()];
		let skills = vec!["Django REST".to_string(), "Go".to_string()];

		assert_eq!(alignment_bonus(&query_terms, &skills), 0.5);
		assert_eq!(alignment_bonus(&[], &skills), 0.0);
		assert_eq!(alignment_bonus(&query_terms, &[]), 0.0);
	}

	#[test]
	fn recency_uses_year_gaps() {
		let cfg = Rerank::default();

		assert_eq!(recency_bonus(&cfg, Some(5), "Backend lead with 6 years of Python"), 1.0);
		assert_eq!(recency_bonus(&cfg, Some(5), "Over 10+ years in finance"), 0.5);
		assert_eq!(recency_bonus(&cfg, Some(2), "Over 10 years in finance"), 0.0);
		assert_eq!(recency_bonus(&cfg, None, "6 years"), 0.0);
		assert_eq!(recency_bonus(&cfg, Some(5), "no tenure stated"), 0.0);
	}

	#[test]
	fn rerank_score_is_unbounded() {
		let cfg = Rerank::default();
		let bonus = signals(
			&cfg,
			0.95,
			&["python".to_string()],
			&["python".to_string()],
			Some(4),
			"4 years of python",
		);

		assert_eq!(bonus.alignment, 1.0);
		assert_eq!(bonus.recency, 1.0);
		assert!((bonus.score - (f64::from(0.95_f32) + 0.3)).abs() < 1e-12);
	}

	#[test]
	fn ranking_ties_fall_back_to_rerank_then_id() {
		let mut rows = [(0.5, 0.7, "b"), (0.5, 0.9, "c"), (0.5, 0.7, "a"), (0.8, 0.1, "d")];

		rows.sort_by(|a, b| compare_ranked(*a, *b));

		let ids: Vec<&str> = rows.iter().map(|row| row.2).collect();

		assert_eq!(ids, vec!["d", "c", "a", "b"]);
	}
}
