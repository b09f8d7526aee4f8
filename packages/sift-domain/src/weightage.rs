use serde::{Deserialize, Serialize};

use sift_config::WEIGHT_SUM_TOLERANCE;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightageError {
	#[error("Weight {component} must be a finite number.")]
	NonFinite { component: &'static str },
	#[error("Weight {component} is {value}; it must be in the range 0.0-1.0.")]
	OutOfRange { component: &'static str, value: f64 },
	#[error("Weights sum to {sum}; they must sum to 1.0.")]
	BadSum { sum: f64 },
}

/// Relative importance of the four scoring components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightageParameters {
	pub education: f64,
	pub skill_match: f64,
	pub experience: f64,
	pub domain_relevance: f64,
}
impl WeightageParameters {
	pub const DEFAULT: Self =
		Self { education: 0.25, skill_match: 0.35, experience: 0.25, domain_relevance: 0.15 };

	pub fn new(
		education: f64,
		skill_match: f64,
		experience: f64,
		domain_relevance: f64,
	) -> Result<Self, WeightageError> {
		let weightage = Self { education, skill_match, experience, domain_relevance };

		weightage.validate()?;

		Ok(weightage)
	}

	pub fn validate(&self) -> Result<(), WeightageError> {
		let weights = self.named();

		for (component, value) in weights {
			if !value.is_finite() {
				return Err(WeightageError::NonFinite { component });
			}
			if !(0.0..=1.0).contains(&value) {
				return Err(WeightageError::OutOfRange { component, value });
			}
		}

		let sum: f64 = weights.iter().map(|(_, value)| value).sum();

		if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
			return Err(WeightageError::BadSum { sum });
		}

		Ok(())
	}

	fn named(&self) -> [(&'static str, f64); 4] {
		[
			("education", self.education),
			("skill_match", self.skill_match),
			("experience", self.experience),
			("domain_relevance", self.domain_relevance),
		]
	}
}

impl Default for WeightageParameters {
	fn default() -> Self {
		Self::DEFAULT
	}
}

impl From<&sift_config::Weightage> for WeightageParameters {
	fn from(cfg: &sift_config::Weightage) -> Self {
		Self {
			education: cfg.education,
			skill_match: cfg.skill_match,
			experience: cfg.experience,
			domain_relevance: cfg.domain_relevance,
		}
	}
}
