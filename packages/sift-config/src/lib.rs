mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EDUCATION_LEVELS, EmbeddingProviderConfig, Providers, Qdrant, Rerank, Retrieval,
	Scoring, Service, Snippet, Storage, Weightage,
};

use std::{fs, path::Path};

/// Allowed distance from 1.0 for the sum of the four scoring weights.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::Parse { path: path.to_path_buf(), source: Box::new(err) })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.candidate_id_field.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.candidate_id_field must be non-empty.".to_string(),
		});
	}

	validate_retrieval(cfg)?;
	validate_rerank(cfg)?;
	validate_scoring(cfg)?;
	validate_weightage("weightage", &cfg.weightage)?;

	if cfg.snippet.max_chars == 0 {
		return Err(Error::Validation {
			message: "snippet.max_chars must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

/// Checks the weightage invariant: every weight in `0.0..=1.0` and the four summing to 1.0.
pub fn validate_weightage(label: &str, weightage: &Weightage) -> Result<()> {
	let weights = [
		("education", weightage.education),
		("skill_match", weightage.skill_match),
		("experience", weightage.experience),
		("domain_relevance", weightage.domain_relevance),
	];

	for (name, weight) in weights {
		if !weight.is_finite() {
			return Err(Error::Validation {
				message: format!("{label}.{name} must be a finite number."),
			});
		}
		if !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("{label}.{name} must be in the range 0.0-1.0."),
			});
		}
	}

	let sum: f64 = weights.iter().map(|(_, weight)| weight).sum();

	if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
		return Err(Error::Validation { message: format!("{label} weights must sum to 1.0.") });
	}

	Ok(())
}

fn validate_retrieval(cfg: &Config) -> Result<()> {
	let retrieval = &cfg.retrieval;

	if retrieval.default_top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.default_top_k must be greater than zero.".to_string(),
		});
	}
	if retrieval.max_top_k < retrieval.default_top_k {
		return Err(Error::Validation {
			message: "retrieval.max_top_k must be at least retrieval.default_top_k.".to_string(),
		});
	}
	if !(1..=4).contains(&retrieval.max_variants) {
		return Err(Error::Validation {
			message: "retrieval.max_variants must be in the range 1-4.".to_string(),
		});
	}
	if retrieval.overfetch_factor == 0 {
		return Err(Error::Validation {
			message: "retrieval.overfetch_factor must be greater than zero.".to_string(),
		});
	}
	if retrieval.variant_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "retrieval.variant_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_rerank(cfg: &Config) -> Result<()> {
	for (label, weight) in [
		("rerank.alignment_weight", cfg.rerank.alignment_weight),
		("rerank.recency_weight", cfg.rerank.recency_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if weight < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	if cfg.rerank.recency_near_years < cfg.rerank.recency_close_years {
		return Err(Error::Validation {
			message: "rerank.recency_near_years must be at least rerank.recency_close_years."
				.to_string(),
		});
	}

	Ok(())
}

fn validate_scoring(cfg: &Config) -> Result<()> {
	let scoring = &cfg.scoring;

	for (label, value) in [
		("scoring.education_normalizer", scoring.education_normalizer),
		("scoring.field_multiplier", scoring.field_multiplier),
		("scoring.requirement_multiplier", scoring.requirement_multiplier),
		("scoring.experience_baseline_years", scoring.experience_baseline_years),
		("scoring.seniority_multiplier", scoring.seniority_multiplier),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if value <= 0.0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	for (label, value) in [
		("scoring.field_multiplier", scoring.field_multiplier),
		("scoring.requirement_multiplier", scoring.requirement_multiplier),
		("scoring.seniority_multiplier", scoring.seniority_multiplier),
	] {
		if value < 1.0 {
			return Err(Error::Validation { message: format!("{label} must be 1.0 or greater.") });
		}
	}

	if scoring.skill_fallback_count == 0 {
		return Err(Error::Validation {
			message: "scoring.skill_fallback_count must be greater than zero.".to_string(),
		});
	}
	if let Some(level) = scoring.implied_education_requirement.as_deref()
		&& !EDUCATION_LEVELS.contains(&level)
	{
		return Err(Error::Validation {
			message: "scoring.implied_education_requirement must be one of doctoral, masters, bachelors, associate, or secondary."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if let Some(level) = cfg.scoring.implied_education_requirement.as_mut() {
		*level = level.trim().to_ascii_lowercase();
	}
	if cfg.scoring.implied_education_requirement.as_deref().map(str::is_empty).unwrap_or(false) {
		cfg.scoring.implied_education_requirement = None;
	}
}
