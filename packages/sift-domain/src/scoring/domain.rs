use crate::{
	candidate::CandidateRecord,
	scoring::{ComponentError, ScoringContext},
	text::Tokens,
};

const KEYWORD_WEIGHT: f64 = 0.6;
const TECHNOLOGY_WEIGHT: f64 = 0.4;

/// Best coverage over the domains the context is about. Zero when the context names no domain.
pub(super) fn score(
	candidate: &CandidateRecord,
	ctx: &ScoringContext<'_>,
) -> Result<f64, ComponentError> {
	if ctx.relevant_domains.is_empty() {
		return Ok(0.0);
	}

	let profile = Tokens::new(&candidate.profile_text());
	let mut best = 0.0_f64;

	for domain in &ctx.relevant_domains {
		let keyword_ratio =
			profile.count_terms(domain.keywords) as f64 / domain.keywords.len() as f64;
		let tech_ratio =
			profile.count_terms(domain.technologies) as f64 / domain.technologies.len() as f64;

		best = best.max(keyword_ratio * KEYWORD_WEIGHT + tech_ratio * TECHNOLOGY_WEIGHT);
	}

	Ok(best.min(1.0))
}
