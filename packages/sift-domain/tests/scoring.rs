use sift_config::Scoring;
use sift_domain::{
	CandidateRecord, Component, ScoringContext, WeightageParameters, score_candidate,
};

const EPS: f64 = 1e-9;

fn scenario_a_candidate() -> CandidateRecord {
	CandidateRecord {
		id: "cand-a".to_string(),
		file_name: "a.pdf".to_string(),
		name: "Ada".to_string(),
		skills: ["python", "django", "postgresql", "aws", "docker"]
			.iter()
			.map(|skill| skill.to_string())
			.collect(),
		experience: vec![
			"Backend Engineer at Shop (2019-2023)".to_string(),
			"Developer at Agency (2016-2019)".to_string(),
		],
		education: vec!["Masters Computer Science".to_string()],
		summary: "Senior engineer, 7 years".to_string(),
		full_text: String::new(),
	}
}

#[test]
fn scenario_a_component_scores() {
	let scoring = Scoring::default();
	let ctx = ScoringContext::new("5+ years Python Django AWS", &scoring);
	let breakdown =
		score_candidate(&scenario_a_candidate(), &ctx, &WeightageParameters::default());

	assert!((breakdown.components.education - 0.832).abs() < EPS, "{breakdown:?}");
	assert!((breakdown.components.skill_match - 1.0).abs() < EPS, "{breakdown:?}");
	assert!((breakdown.components.experience - 0.968).abs() < EPS, "{breakdown:?}");
	assert!(breakdown.degraded.is_empty());
}

#[test]
fn weighted_contributions_sum_to_final_score() {
	let scoring = Scoring::default();
	let ctx = ScoringContext::new("5+ years Python Django AWS backend api", &scoring);
	let weightage = WeightageParameters::new(0.1, 0.2, 0.3, 0.4).expect("valid weightage");
	let breakdown = score_candidate(&scenario_a_candidate(), &ctx, &weightage);
	let sum = breakdown.weighted.education
		+ breakdown.weighted.skill_match
		+ breakdown.weighted.experience
		+ breakdown.weighted.domain_relevance;

	assert!((breakdown.final_score - sum).abs() < EPS);
	assert!((breakdown.weighted.experience - breakdown.components.experience * 0.3).abs() < EPS);
	assert_eq!(breakdown.weightage, weightage);
}

#[test]
fn scoring_is_bit_identical_across_calls() {
	let scoring = Scoring::default();
	let ctx = ScoringContext::new("Senior data engineer, 3-5 years SQL and Python", &scoring);
	let candidate = scenario_a_candidate();
	let weightage = WeightageParameters::default();
	let first = score_candidate(&candidate, &ctx, &weightage);
	let second = score_candidate(&candidate, &ctx, &weightage);

	assert_eq!(first.final_score.to_bits(), second.final_score.to_bits());
	assert_eq!(first, second);
}

#[test]
fn scores_stay_bounded_for_extreme_profiles() {
	let scoring = Scoring::default();
	let contexts = [
		"",
		"phd required, 1 year, python java javascript react node angular spring sql docker aws",
		"finance banking trading investment fintech excel bloomberg matlab r python sql",
	];
	let heavy = CandidateRecord {
		skills: (0..200).map(|idx| format!("python skill {idx}")).collect(),
		experience: (0..60).map(|idx| format!("Lead role {idx}")).collect(),
		education: vec!["PhD Computer Engineering".to_string(), "MBA Business".to_string()],
		summary: "Principal engineer and manager, 40 years".to_string(),
		..CandidateRecord::default()
	};
	let empty = CandidateRecord::default();

	for context in contexts {
		let ctx = ScoringContext::new(context, &scoring);

		for candidate in [&heavy, &empty] {
			let breakdown = score_candidate(candidate, &ctx, &WeightageParameters::default());

			for value in [
				breakdown.components.education,
				breakdown.components.skill_match,
				breakdown.components.experience,
				breakdown.components.domain_relevance,
				breakdown.final_score,
			] {
				assert!((0.0..=1.0).contains(&value), "{context:?} -> {breakdown:?}");
			}
		}
	}
}

#[test]
fn malformed_years_degrade_only_experience() {
	let scoring = Scoring::default();
	let ctx = ScoringContext::new("5+ years Python", &scoring);
	let candidate = CandidateRecord {
		summary: "Claims 123456789012345 years of python".to_string(),
		..scenario_a_candidate()
	};
	let breakdown = score_candidate(&candidate, &ctx, &WeightageParameters::default());

	assert_eq!(breakdown.degraded, vec![Component::Experience]);
	assert_eq!(breakdown.components.experience, 0.0);
	assert!(breakdown.components.skill_match > 0.0);
}

#[test]
fn experience_is_monotonic_until_the_cap() {
	let scoring = Scoring::default();
	let ctx = ScoringContext::new("at least 5 years of rust", &scoring);
	let mut previous = 0.0;
	let mut reached_cap = false;

	for actual in 0..=30 {
		let candidate = CandidateRecord {
			experience: (0..actual).map(|idx| format!("Role {idx}")).collect(),
			..CandidateRecord::default()
		};
		let score = score_candidate(&candidate, &ctx, &WeightageParameters::default())
			.components
			.experience;

		assert!(score >= previous, "actual={actual} score={score} previous={previous}");

		if reached_cap {
			assert_eq!(score, previous);
		}
		if (score - 1.0).abs() < EPS {
			reached_cap = true;
		}

		previous = score;
	}

	assert!(reached_cap);
}
