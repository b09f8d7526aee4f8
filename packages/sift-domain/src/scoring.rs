//! Weighted multi-component candidate scoring.
//!
//! Four independent components, each bounded to `0.0..=1.0`, are combined with
//! [`WeightageParameters`]. A component that fails on malformed candidate data scores 0 and is
//! listed in [`ScoreBreakdown::degraded`]; scoring itself never fails.

mod domain;
mod education;
mod experience;
mod skills;

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use sift_config::Scoring;

use crate::{
	candidate::CandidateRecord,
	taxonomy::{
		self, AMBIGUOUS_REQUIREMENT_ALIASES, EDUCATION_LEVELS, SCORING_DOMAINS, ScoringDomain,
	},
	text::{self, Tokens},
	weightage::WeightageParameters,
};

static REQUIRED_YEARS_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(r"(\d+)\s*(?:\+|(?:to|-)\s*\d+)?\s*(?:years?|yrs?)").ok()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
	Education,
	SkillMatch,
	Experience,
	DomainRelevance,
}
impl Component {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Education => "education",
			Self::SkillMatch => "skill_match",
			Self::Experience => "experience",
			Self::DomainRelevance => "domain_relevance",
		}
	}
}

impl fmt::Display for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
	#[error("Year count {raw} does not fit in a u32.")]
	YearOverflow { raw: String },
	#[error("Component {component} produced a non-finite value.")]
	NonFinite { component: Component },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ComponentScores {
	pub education: f64,
	pub skill_match: f64,
	pub experience: f64,
	pub domain_relevance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
	/// Raw component scores, each in `0.0..=1.0`.
	pub components: ComponentScores,
	/// Component scores multiplied by their weights.
	pub weighted: ComponentScores,
	pub final_score: f64,
	pub weightage: WeightageParameters,
	pub degraded: Vec<Component>,
}
impl ScoreBreakdown {
	pub fn is_degraded(&self) -> bool {
		!self.degraded.is_empty()
	}
}

/// Per-request view of the context text, computed once and shared by every candidate.
pub struct ScoringContext<'a> {
	scoring: &'a Scoring,
	tokens: Tokens,
	required_years: Result<u32, ComponentError>,
	/// Index into `EDUCATION_LEVELS`.
	required_education: Option<usize>,
	/// One slot per (domain, technology) pair mentioned, so shared technologies count once per
	/// domain.
	technology_slots: Vec<&'static str>,
	relevant_domains: Vec<&'static ScoringDomain>,
}
impl<'a> ScoringContext<'a> {
	pub fn new(context_text: &str, scoring: &'a Scoring) -> Self {
		let normalized = text::normalize(context_text);
		let tokens = Tokens::new(&normalized);
		let required_education = named_education_requirement(&tokens).or_else(|| {
			scoring.implied_education_requirement.as_deref().and_then(taxonomy::education_level_index)
		});
		let technology_slots = SCORING_DOMAINS
			.iter()
			.flat_map(|domain| domain.technologies.iter().copied())
			.filter(|tech| tokens.contains_term(tech))
			.collect();
		let relevant_domains =
			SCORING_DOMAINS.iter().filter(|domain| tokens.contains_any(domain.keywords)).collect();

		Self {
			scoring,
			required_years: extract_required_years(&normalized),
			tokens,
			required_education,
			technology_slots,
			relevant_domains,
		}
	}

	/// Context used for scoring: job description first, then the query.
	pub fn from_request(query: &str, job_description: Option<&str>, scoring: &'a Scoring) -> Self {
		match job_description.map(str::trim).filter(|jd| !jd.is_empty()) {
			Some(jd) => Self::new(&format!("{jd} {query}"), scoring),
			None => Self::new(query, scoring),
		}
	}

	pub fn required_years(&self) -> Option<u32> {
		self.required_years.as_ref().ok().copied()
	}

	pub fn required_education(&self) -> Option<&'static str> {
		self.required_education.map(|idx| EDUCATION_LEVELS[idx].name)
	}
}

pub fn score_candidate(
	candidate: &CandidateRecord,
	ctx: &ScoringContext<'_>,
	weightage: &WeightageParameters,
) -> ScoreBreakdown {
	let mut degraded = Vec::new();
	let components = ComponentScores {
		education: settle(Component::Education, education::score(candidate, ctx), &mut degraded),
		skill_match: settle(Component::SkillMatch, skills::score(candidate, ctx), &mut degraded),
		experience: settle(Component::Experience, experience::score(candidate, ctx), &mut degraded),
		domain_relevance: settle(
			Component::DomainRelevance,
			domain::score(candidate, ctx),
			&mut degraded,
		),
	};
	let weighted = ComponentScores {
		education: components.education * weightage.education,
		skill_match: components.skill_match * weightage.skill_match,
		experience: components.experience * weightage.experience,
		domain_relevance: components.domain_relevance * weightage.domain_relevance,
	};
	let sum = weighted.education
		+ weighted.skill_match
		+ weighted.experience
		+ weighted.domain_relevance;
	let final_score = if sum.is_finite() { sum.clamp(0.0, 1.0) } else { 0.0 };

	ScoreBreakdown { components, weighted, final_score, weightage: *weightage, degraded }
}

fn settle(
	component: Component,
	result: Result<f64, ComponentError>,
	degraded: &mut Vec<Component>,
) -> f64 {
	let checked = result.and_then(|value| {
		if value.is_finite() { Ok(value) } else { Err(ComponentError::NonFinite { component }) }
	});

	match checked {
		Ok(value) => value.clamp(0.0, 1.0),
		Err(_) => {
			degraded.push(component);

			0.0
		},
	}
}

fn extract_required_years(normalized: &str) -> Result<u32, ComponentError> {
	let Some(capture) = REQUIRED_YEARS_RE
		.as_ref()
		.and_then(|re| re.captures(normalized))
		.and_then(|caps| caps.get(1))
	else {
		return Ok(0);
	};

	parse_years(capture.as_str())
}

pub(crate) fn parse_years(raw: &str) -> Result<u32, ComponentError> {
	raw.parse().map_err(|_| ComponentError::YearOverflow { raw: raw.to_string() })
}

/// Lowest level the context names, since any named level is acceptable.
fn named_education_requirement(tokens: &Tokens) -> Option<usize> {
	EDUCATION_LEVELS
		.iter()
		.enumerate()
		.filter(|(_, level)| {
			level
				.aliases
				.iter()
				.filter(|alias| !AMBIGUOUS_REQUIREMENT_ALIASES.contains(alias))
				.any(|alias| tokens.contains_term(alias))
		})
		.map(|(idx, _)| idx)
		.max()
}
