use std::{cmp::Ordering, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::{
	taxonomy::{
		BUSINESS_DOMAIN_TERMS, QUERY_KIND_TERMS, QUERY_VERBS, ROLE_TERMS, SENIORITY_TERMS,
		SKILL_CONTEXTS, SKILL_SYNONYMS, STOP_WORDS, TECHNICAL_TERMS,
	},
	text::{self, Tokens},
};

const MAX_MATCHED_TERMS: usize = 5;
const MAX_SEMANTIC_KEYWORDS: usize = 10;
const GENERAL_CONFIDENCE: f32 = 0.5;

static QUERY_YEARS_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(\d+)\s*\+?\s*(?:years?|yrs?)").ok());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
	SkillSearch,
	ExperienceQuery,
	ComparisonQuery,
	RoleSpecific,
	#[default]
	General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
	Senior,
	Mid,
	Junior,
}
impl Seniority {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Senior => "senior",
			Self::Mid => "mid",
			Self::Junior => "junior",
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
	Frontend,
	Backend,
	Fullstack,
	Devops,
	DataScience,
	#[default]
	General,
}
impl RoleType {
	/// Wording used when the role is spliced into a retrieval query.
	pub fn query_term(self) -> Option<&'static str> {
		match self {
			Self::Frontend => Some("frontend"),
			Self::Backend => Some("backend"),
			Self::Fullstack => Some("fullstack"),
			Self::Devops => Some("devops"),
			Self::DataScience => Some("data science"),
			Self::General => None,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessDomain {
	Fintech,
	Healthcare,
	Ecommerce,
	Gaming,
	#[default]
	General,
}
impl BusinessDomain {
	pub fn query_term(self) -> Option<&'static str> {
		match self {
			Self::Fintech => Some("fintech"),
			Self::Healthcare => Some("healthcare"),
			Self::Ecommerce => Some("ecommerce"),
			Self::Gaming => Some("gaming"),
			Self::General => None,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
	#[default]
	Low,
	Medium,
	High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillDomainMatch {
	pub domain: String,
	pub confidence: f32,
	pub matched_terms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExperienceIndicators {
	pub years: Option<u32>,
	pub seniority: Option<Seniority>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Intent {
	pub query_kind: QueryKind,
	pub kind_confidence: f32,
	pub skill_domains: Vec<SkillDomainMatch>,
	pub experience: ExperienceIndicators,
	pub role_type: RoleType,
	pub business_domain: BusinessDomain,
	pub specificity: Level,
	pub technical_depth: Level,
	/// Canonical skill names the query mentions through any synonym.
	pub skill_terms: Vec<String>,
	pub semantic_keywords: Vec<String>,
	pub context_aware: bool,
}

/// Parses a hiring query into structured intent.
///
/// Never fails. Blank or degenerate input yields `Intent::default()`. `prior` is earlier
/// conversation text; its years and seniority fill in what the query leaves unset.
pub fn analyze(query: &str, prior: Option<&str>) -> Intent {
	let tokens = Tokens::new(query);

	if tokens.is_empty() {
		return Intent::default();
	}

	let (query_kind, kind_confidence) = detect_query_kind(&tokens);
	let skill_terms = mentioned_skill_terms(&tokens);
	let specificity = match skill_terms.len() {
		0 => Level::Low,
		1..=3 => Level::Medium,
		_ => Level::High,
	};
	let technical_depth = match tokens.count_terms(&TECHNICAL_TERMS) {
		0..=1 => Level::Low,
		2..=4 => Level::Medium,
		_ => Level::High,
	};
	let mut experience = ExperienceIndicators {
		years: extract_query_years(&text::normalize(query)),
		seniority: detect_seniority(&tokens),
	};
	let prior = prior.map(str::trim).filter(|prior| !prior.is_empty());

	if let Some(prior) = prior {
		let prior_tokens = Tokens::new(prior);

		if experience.years.is_none() {
			experience.years = extract_query_years(&text::normalize(prior));
		}
		if experience.seniority.is_none() {
			experience.seniority = detect_seniority(&prior_tokens);
		}
	}

	Intent {
		query_kind,
		kind_confidence,
		skill_domains: score_skill_domains(&tokens),
		experience,
		role_type: first_listed(&tokens, &ROLE_TERMS).unwrap_or_default(),
		business_domain: first_listed(&tokens, &BUSINESS_DOMAIN_TERMS).unwrap_or_default(),
		specificity,
		technical_depth,
		skill_terms,
		semantic_keywords: semantic_keywords(&tokens),
		context_aware: prior.is_some(),
	}
}

/// First "N years" integer in already-normalized text. Values that overflow are ignored.
pub fn extract_query_years(normalized: &str) -> Option<u32> {
	let re = QUERY_YEARS_RE.as_ref()?;

	re.captures(normalized)?.get(1)?.as_str().parse().ok()
}

pub fn detect_seniority(tokens: &Tokens) -> Option<Seniority> {
	SENIORITY_TERMS
		.iter()
		.find(|(_, terms)| tokens.contains_any(terms))
		.map(|(level, _)| *level)
}

pub fn mentioned_skill_terms(tokens: &Tokens) -> Vec<String> {
	SKILL_SYNONYMS
		.iter()
		.filter(|entry| tokens.contains_any(entry.synonyms))
		.map(|entry| entry.canonical.to_string())
		.collect()
}

fn detect_query_kind(tokens: &Tokens) -> (QueryKind, f32) {
	let mut best: Option<(QueryKind, f32)> = None;

	for (kind, confidence, terms) in &QUERY_KIND_TERMS {
		if !tokens.contains_any(terms) {
			continue;
		}
		if best.map(|(_, current)| *confidence > current).unwrap_or(true) {
			best = Some((*kind, *confidence));
		}
	}

	best.unwrap_or((QueryKind::General, GENERAL_CONFIDENCE))
}

fn score_skill_domains(tokens: &Tokens) -> Vec<SkillDomainMatch> {
	let mut matches = Vec::new();

	for context in &SKILL_CONTEXTS {
		let primary_hits = tokens.count_terms(context.primary);
		let related_hits = tokens.count_terms(context.related);
		let raw = (2 * primary_hits + related_hits) as f32 / context.primary.len() as f32;

		if raw <= 0.0 {
			continue;
		}

		let matched_terms = context
			.primary
			.iter()
			.chain(context.related.iter())
			.filter(|term| tokens.contains_term(term))
			.take(MAX_MATCHED_TERMS)
			.map(|term| term.to_string())
			.collect();

		matches.push(SkillDomainMatch {
			domain: context.name.to_string(),
			confidence: raw.min(1.0),
			matched_terms,
		});
	}

	matches.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal));

	matches
}

fn first_listed<T>(tokens: &Tokens, table: &[(T, &[&str])]) -> Option<T>
where
	T: Copy,
{
	table.iter().find(|(_, terms)| tokens.contains_any(terms)).map(|(value, _)| *value)
}

fn semantic_keywords(tokens: &Tokens) -> Vec<String> {
	let mut keywords: Vec<String> = Vec::new();

	for token in tokens.as_slice() {
		if token.chars().count() <= 2
			|| STOP_WORDS.contains(&token.as_str())
			|| QUERY_VERBS.contains(&token.as_str())
			|| keywords.contains(token)
		{
			continue;
		}

		keywords.push(token.clone());

		if keywords.len() == MAX_SEMANTIC_KEYWORDS {
			break;
		}
	}

	keywords
}
