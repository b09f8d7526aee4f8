use serde::Deserialize;
use serde_json::{Map, Value};

pub const EDUCATION_LEVELS: [&str; 5] = ["doctoral", "masters", "bachelors", "associate", "secondary"];

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	pub storage: Storage,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub rerank: Rerank,
	#[serde(default)]
	pub scoring: Scoring,
	#[serde(default)]
	pub weightage: Weightage,
	#[serde(default)]
	pub snippet: Snippet,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
	/// Payload field holding the candidate id. Index points are usually resume chunks, so the
	/// point id itself is not the candidate id.
	#[serde(default = "default_candidate_id_field")]
	pub candidate_id_field: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub default_top_k: u32,
	pub max_top_k: u32,
	/// Upper bound on query variants per request. Never more than four.
	pub max_variants: u32,
	/// Hits requested per variant, as a multiple of `top_k`.
	pub overfetch_factor: u32,
	pub variant_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Rerank {
	pub alignment_weight: f64,
	pub recency_weight: f64,
	pub recency_close_years: u32,
	pub recency_near_years: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Scoring {
	/// Calibration constant. The largest reachable raw education score is 1.0 * 1.2 * 1.3.
	pub education_normalizer: f64,
	pub field_multiplier: f64,
	pub requirement_multiplier: f64,
	/// Level assumed to be required when the context names none. `None` disables the assumption.
	pub implied_education_requirement: Option<String>,
	pub experience_baseline_years: f64,
	pub seniority_multiplier: f64,
	pub skill_fallback_count: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Weightage {
	pub education: f64,
	pub skill_match: f64,
	pub experience: f64,
	pub domain_relevance: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Snippet {
	pub max_chars: usize,
}

impl Default for Retrieval {
	fn default() -> Self {
		Self {
			default_top_k: 10,
			max_top_k: 100,
			max_variants: 4,
			overfetch_factor: 2,
			variant_timeout_ms: 10_000,
		}
	}
}

impl Default for Rerank {
	fn default() -> Self {
		Self {
			alignment_weight: 0.2,
			recency_weight: 0.1,
			recency_close_years: 2,
			recency_near_years: 5,
		}
	}
}

impl Default for Scoring {
	fn default() -> Self {
		Self {
			education_normalizer: 1.5,
			field_multiplier: 1.2,
			requirement_multiplier: 1.3,
			implied_education_requirement: Some("bachelors".to_string()),
			experience_baseline_years: 5.0,
			seniority_multiplier: 1.1,
			skill_fallback_count: 10,
		}
	}
}

impl Default for Weightage {
	fn default() -> Self {
		Self { education: 0.25, skill_match: 0.35, experience: 0.25, domain_relevance: 0.15 }
	}
}

impl Default for Snippet {
	fn default() -> Self {
		Self { max_chars: 300 }
	}
}

fn default_candidate_id_field() -> String {
	"candidate_id".to_string()
}
