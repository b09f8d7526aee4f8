use crate::{
	candidate::CandidateRecord,
	scoring::{ComponentError, ScoringContext},
	taxonomy::{EDUCATION_LEVELS, FIELD_RELATED_TERMS},
	text::Tokens,
};

/// Best entry wins: level score, times the field multiplier when the entry's field relates to the
/// context, times the requirement multiplier when the level meets the requirement, then divided by
/// the normalizer.
pub(super) fn score(
	candidate: &CandidateRecord,
	ctx: &ScoringContext<'_>,
) -> Result<f64, ComponentError> {
	let scoring = ctx.scoring;
	let mut best = 0.0_f64;

	for entry in &candidate.education {
		let tokens = Tokens::new(entry);
		let Some(level_idx) = highest_level(&tokens) else {
			continue;
		};
		let mut value = EDUCATION_LEVELS[level_idx].score;

		if field_relevant(&tokens, &ctx.tokens) {
			value *= scoring.field_multiplier;
		}
		// Lower index means a higher level.
		if ctx.required_education.is_some_and(|required| level_idx <= required) {
			value *= scoring.requirement_multiplier;
		}

		best = best.max(value);
	}

	Ok((best / scoring.education_normalizer).min(1.0))
}

fn highest_level(tokens: &Tokens) -> Option<usize> {
	EDUCATION_LEVELS.iter().position(|level| tokens.contains_any(level.aliases))
}

fn field_relevant(entry: &Tokens, context: &Tokens) -> bool {
	FIELD_RELATED_TERMS
		.iter()
		.filter(|(field, _)| entry.contains_term(field))
		.any(|(_, related)| context.contains_any(related))
}
