use crate::{
	candidate::CandidateRecord,
	scoring::{ComponentError, ScoringContext},
	text::{self, Tokens},
};

/// Direct word overlap plus technology slots, over the number of slots.
///
/// With no technology named in the context the score falls back to skill-list breadth.
pub(super) fn score(
	candidate: &CandidateRecord,
	ctx: &ScoringContext<'_>,
) -> Result<f64, ComponentError> {
	if candidate.skills.is_empty() {
		return Ok(0.0);
	}

	let context_words = ctx.tokens.word_set();
	let normalized_skills: Vec<String> =
		candidate.skills.iter().map(|skill| text::normalize(skill)).collect();
	let mut matches = 0_usize;

	for skill in &candidate.skills {
		let skill_tokens = Tokens::new(skill);

		if skill_tokens.as_slice().iter().any(|word| context_words.contains(word.as_str())) {
			matches += 1;
		}
	}
	for tech in &ctx.technology_slots {
		if normalized_skills.iter().any(|skill| skill.contains(tech)) {
			matches += 1;
		}
	}

	let ratio = if ctx.technology_slots.is_empty() {
		candidate.skills.len() as f64 / f64::from(ctx.scoring.skill_fallback_count)
	} else {
		matches as f64 / ctx.technology_slots.len() as f64
	};

	Ok(ratio.min(1.0))
}

#[cfg(test)]
mod tests {
	use sift_config::Scoring;

	use super::*;

	fn candidate(skills: &[&str]) -> CandidateRecord {
		CandidateRecord {
			skills: skills.iter().map(|skill| skill.to_string()).collect(),
			..CandidateRecord::default()
		}
	}

	#[test]
	fn falls_back_to_breadth_without_technology_slots() {
		let scoring = Scoring::default();
		let ctx = ScoringContext::new("friendly team player", &scoring);
		let breadth = score(&candidate(&["excel", "word", "outlook"]), &ctx).expect("no failure");

		assert!((breadth - 0.3).abs() < 1e-12);
	}

	#[test]
	fn partial_slot_coverage() {
		let scoring = Scoring::default();
		// Slots: docker (devops), kubernetes (devops).
		let ctx = ScoringContext::new("docker kubernetes", &scoring);
		let covered = score(&candidate(&["Docker Compose"]), &ctx).expect("no failure");
		let uncovered = score(&candidate(&["ansible"]), &ctx).expect("no failure");

		// One direct word match plus one covered slot, over two slots.
		assert_eq!(covered, 1.0);
		assert_eq!(uncovered, 0.0);
	}

	#[test]
	fn no_skills_scores_zero() {
		let scoring = Scoring::default();
		let ctx = ScoringContext::new("python", &scoring);

		assert_eq!(score(&candidate(&[]), &ctx), Ok(0.0));
	}
}
