use std::collections::HashSet;

use serde::Serialize;

use sift_domain::{Intent, text};

const SKILL_FOCUS_TERMS: usize = 3;
const VARIANT_LIMIT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
	Base,
	Role,
	Seniority,
	SkillFocus,
	BusinessDomain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryVariant {
	pub kind: VariantKind,
	pub text: String,
}

/// Derives retrieval variants from the expanded query and its intent.
///
/// The base variant always comes first. Variants whose normalized text repeats an earlier one are
/// dropped, and at most `max_variants` (never more than four) are returned.
pub fn plan_variants(expanded: &str, intent: &Intent, max_variants: usize) -> Vec<QueryVariant> {
	let mut planned = vec![(VariantKind::Base, expanded.to_string())];

	if let Some(role) = intent.role_type.query_term() {
		planned.push((VariantKind::Role, format!("{role} developer {expanded}")));
	}
	if let Some(seniority) = intent.experience.seniority {
		planned.push((VariantKind::Seniority, format!("{} {expanded}", seniority.as_str())));
	}

	let focus = skill_focus_terms(intent);

	if !focus.is_empty() {
		planned.push((VariantKind::SkillFocus, focus.join(" ")));
	}
	if planned.len() < VARIANT_LIMIT
		&& let Some(domain) = intent.business_domain.query_term()
	{
		planned.push((VariantKind::BusinessDomain, format!("{expanded} {domain} experience")));
	}

	let limit = max_variants.clamp(1, VARIANT_LIMIT);
	let mut seen = HashSet::new();
	let mut variants = Vec::with_capacity(limit);

	for (kind, text) in planned {
		let key = text::tokenize(&text).join(" ");

		if key.is_empty() || !seen.insert(key) {
			continue;
		}

		variants.push(QueryVariant { kind, text });

		if variants.len() == limit {
			break;
		}
	}

	variants
}

/// Matched terms of the strongest domains, best domain first.
fn skill_focus_terms(intent: &Intent) -> Vec<&str> {
	let mut terms: Vec<&str> = Vec::with_capacity(SKILL_FOCUS_TERMS);

	for term in intent.skill_domains.iter().flat_map(|domain| domain.matched_terms.iter()) {
		if terms.len() == SKILL_FOCUS_TERMS {
			break;
		}
		if !terms.contains(&term.as_str()) {
			terms.push(term);
		}
	}

	terms
}

#[cfg(test)]
mod tests {
	use sift_domain::{analyze, expand_query};

	use super::*;

	fn plan(query: &str, max_variants: usize) -> Vec<QueryVariant> {
		plan_variants(&expand_query(query), &analyze(query, None), max_variants)
	}

	#[test]
	fn vague_query_yields_only_the_base_variant() {
		let variants = plan("find developers", 4);

		assert_eq!(variants.len(), 1);
		assert_eq!(variants[0].kind, VariantKind::Base);
	}

	#[test]
	fn rich_query_fills_role_seniority_and_skill_variants() {
		let variants = plan("senior backend engineer with python and docker", 4);
		let kinds: Vec<VariantKind> = variants.iter().map(|variant| variant.kind).collect();

		assert_eq!(
			kinds,
			vec![
				VariantKind::Base,
				VariantKind::Role,
				VariantKind::Seniority,
				VariantKind::SkillFocus
			]
		);
		assert!(variants[1].text.starts_with("backend developer "));
		assert!(variants[2].text.starts_with("senior "));
	}

	#[test]
	fn business_domain_variant_only_fills_spare_slots() {
		let variants = plan("fintech python developer", 4);

		assert!(variants.iter().any(|variant| variant.kind == VariantKind::BusinessDomain));
		assert!(
			variants
				.iter()
				.any(|variant| variant.text.ends_with("fintech experience"))
		);
	}

	#[test]
	fn max_variants_caps_the_plan() {
		let variants = plan("senior backend engineer with python and docker", 2);

		assert_eq!(variants.len(), 2);
		assert_eq!(variants[0].kind, VariantKind::Base);
	}

	#[test]
	fn duplicate_texts_collapse() {
		let intent = Intent {
			skill_domains: vec![sift_domain::SkillDomainMatch {
				domain: "backend".to_string(),
				confidence: 1.0,
				matched_terms: vec!["python".to_string()],
			}],
			..Intent::default()
		};
		let variants = plan_variants("Python", &intent, 4);

		assert_eq!(variants.len(), 1);
	}
}
