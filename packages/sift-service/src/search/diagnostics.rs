use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use sift_domain::{Intent, WeightageParameters};

use crate::{search::retrieval::VariantReport, weightage::WeightageOrigin};

const SKILL_WINDOW: usize = 10;
const TOP_SKILLS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
	pub trace_id: Uuid,
	#[serde(with = "time::serde::rfc3339")]
	pub started_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub finished_at: OffsetDateTime,
	pub intent: Intent,
	pub expanded_query: String,
	pub variants: Vec<VariantReport>,
	pub raw_hits: usize,
	pub unique_candidates: usize,
	pub stale_skipped: usize,
	pub degraded_candidates: Vec<String>,
	pub weighted: bool,
	pub weightage: WeightageParameters,
	pub weightage_origin: WeightageOrigin,
	pub warnings: Vec<String>,
	pub quality: QualityReport,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityReport {
	pub average_score: f64,
	pub top_score: f64,
	/// Lowest score over highest; 0 when the top score is 0.
	pub consistency: f64,
	pub histogram: ScoreHistogram,
	pub skills: SkillDistribution,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreHistogram {
	pub excellent: usize,
	pub good: usize,
	pub fair: usize,
	pub poor: usize,
}
impl ScoreHistogram {
	fn record(&mut self, score: f64) {
		if score > 0.8 {
			self.excellent += 1;
		} else if score > 0.6 {
			self.good += 1;
		} else if score > 0.4 {
			self.fair += 1;
		} else {
			self.poor += 1;
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkillDistribution {
	pub most_common: Vec<SkillCount>,
	pub unique_skills: usize,
	/// Unique skills over all skill mentions.
	pub diversity: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCount {
	pub skill: String,
	pub count: usize,
}

/// Quality summary over final scores and the skills of the leading matches.
pub(crate) fn quality<'a>(
	scores: &[f64],
	skills: impl IntoIterator<Item = &'a [String]>,
) -> QualityReport {
	let mut histogram = ScoreHistogram::default();

	for score in scores {
		histogram.record(*score);
	}

	let (average_score, top_score, consistency) = if scores.is_empty() {
		(0.0, 0.0, 0.0)
	} else {
		let top = scores.iter().copied().fold(f64::MIN, f64::max);
		let low = scores.iter().copied().fold(f64::MAX, f64::min);
		let average = scores.iter().sum::<f64>() / scores.len() as f64;

		(average, top, if top > 0.0 { low / top } else { 0.0 })
	};

	QualityReport {
		average_score,
		top_score,
		consistency,
		histogram,
		skills: skill_distribution(skills),
	}
}

fn skill_distribution<'a>(skills: impl IntoIterator<Item = &'a [String]>) -> SkillDistribution {
	let mut counts: HashMap<String, usize> = HashMap::new();
	let mut mentions = 0_usize;

	for skill in skills.into_iter().take(SKILL_WINDOW).flatten() {
		let skill = skill.trim().to_lowercase();

		if skill.is_empty() {
			continue;
		}

		mentions += 1;
		*counts.entry(skill).or_default() += 1;
	}

	if mentions == 0 {
		return SkillDistribution::default();
	}

	let unique_skills = counts.len();
	let mut most_common: Vec<SkillCount> =
		counts.into_iter().map(|(skill, count)| SkillCount { skill, count }).collect();

	most_common.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
	most_common.truncate(TOP_SKILLS);

	SkillDistribution {
		most_common,
		unique_skills,
		diversity: unique_skills as f64 / mentions as f64,
	}
}
