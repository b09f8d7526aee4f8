use std::sync::LazyLock;

use regex::Regex;

use crate::{
	candidate::CandidateRecord,
	scoring::{self, ComponentError, ScoringContext},
	taxonomy::SUMMARY_SENIORITY_TERMS,
	text::{self, Tokens},
};

const MEETS_REQUIREMENT: f64 = 0.8;
const MAX_EXCESS_BONUS: f64 = 0.2;

static SUMMARY_YEARS_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(\d+)\s*\+?\s*years?").ok());

pub(super) fn score(
	candidate: &CandidateRecord,
	ctx: &ScoringContext<'_>,
) -> Result<f64, ComponentError> {
	let scoring = ctx.scoring;
	let required = f64::from(ctx.required_years.clone()?);
	let actual = actual_years(candidate)?;
	let mut value = if required > 0.0 {
		tenure_score(actual, required)
	} else {
		(actual / scoring.experience_baseline_years).min(1.0)
	};

	if Tokens::new(&candidate.summary).contains_any(&SUMMARY_SENIORITY_TERMS) {
		value *= scoring.seniority_multiplier;
	}

	Ok(value.min(1.0))
}

/// Meeting the requirement earns 0.8; each excess year adds a proportional bonus capped at 0.2.
/// Falling short scales linearly below 0.8.
pub fn tenure_score(actual: f64, required: f64) -> f64 {
	if actual >= required {
		MEETS_REQUIREMENT + ((actual - required) / required * MAX_EXCESS_BONUS).min(MAX_EXCESS_BONUS)
	} else {
		actual / required * MEETS_REQUIREMENT
	}
}

/// Larger of the experience entry count and any "N years" in the summary.
fn actual_years(candidate: &CandidateRecord) -> Result<f64, ComponentError> {
	let mut actual = candidate.experience.len() as f64;
	let Some(re) = SUMMARY_YEARS_RE.as_ref() else {
		return Ok(actual);
	};
	let summary = text::normalize(&candidate.summary);

	for caps in re.captures_iter(&summary) {
		if let Some(raw) = caps.get(1) {
			actual = actual.max(f64::from(scoring::parse_years(raw.as_str())?));
		}
	}

	Ok(actual)
}

#[cfg(test)]
mod tests {
	use sift_config::Scoring;

	use super::*;

	fn candidate(entries: usize, summary: &str) -> CandidateRecord {
		CandidateRecord {
			experience: (0..entries).map(|idx| format!("Role {idx}")).collect(),
			summary: summary.to_string(),
			..CandidateRecord::default()
		}
	}

	#[test]
	fn summary_years_beat_entry_count() {
		let summary = "Engineer with 4 years, then 9+ years consulting";

		assert_eq!(actual_years(&candidate(2, summary)), Ok(9.0));
		assert_eq!(actual_years(&candidate(3, "")), Ok(3.0));
	}

	#[test]
	fn summary_overflow_is_reported() {
		let result = actual_years(&candidate(1, "99999999999 years of uptime"));

		assert!(matches!(result, Err(ComponentError::YearOverflow { .. })));
	}

	#[test]
	fn no_requirement_uses_baseline() {
		let scoring = Scoring::default();
		let ctx = ScoringContext::new("rust developer", &scoring);

		assert_eq!(score(&candidate(2, "Backend developer"), &ctx), Ok(0.4));
	}

	#[test]
	fn shortfall_scales_linearly() {
		assert!((tenure_score(2.0, 4.0) - 0.4).abs() < 1e-12);
		assert_eq!(tenure_score(4.0, 4.0), 0.8);
		assert!((tenure_score(12.0, 4.0) - 1.0).abs() < 1e-12);
	}
}
