mod assemble;
mod diagnostics;
mod rerank;
mod retrieval;
mod strategy;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

pub use diagnostics::{Diagnostics, QualityReport, ScoreHistogram, SkillCount, SkillDistribution};
pub use retrieval::{RawHit, VariantReport};
pub use strategy::{QueryVariant, VariantKind, plan_variants};

use sift_domain::{
	CandidateRecord, Intent, ScoreBreakdown, ScoringContext, WeightageParameters, analyze,
	expand_query, score_candidate, text,
};
use sift_storage::models::{self, PayloadFilter};

use crate::{
	CandidateStore, EmbeddingProvider, Error, RankingService, Result,
	search::{rerank::RerankSignals, retrieval::RetrievalPlan},
	weightage::{self, ResolvedWeightage},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankRequest {
	pub query: String,
	#[serde(default)]
	pub job_description: Option<String>,
	/// Defaults to `retrieval.default_top_k`; values above `retrieval.max_top_k` are clamped.
	#[serde(default)]
	pub top_k: Option<u32>,
	#[serde(default)]
	pub filters: Option<PayloadFilter>,
	#[serde(default)]
	pub weightage: Option<WeightageParameters>,
	#[serde(default)]
	pub session_id: Option<String>,
	/// Rank by the weighted component score instead of the retrieval re-rank score.
	#[serde(default)]
	pub weighted: bool,
	#[serde(default)]
	pub include_breakdown: bool,
	/// Earlier conversation text used to fill in unstated intent.
	#[serde(default)]
	pub prior_context: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalExplain {
	pub max_similarity: f32,
	pub alignment_bonus: f64,
	pub recency_bonus: f64,
	pub rerank_score: f64,
	pub variants: Vec<VariantKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedMatch {
	pub candidate_id: String,
	pub file_name: String,
	pub final_score: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub breakdown: Option<ScoreBreakdown>,
	pub name: String,
	pub skills: Vec<String>,
	pub summary: String,
	pub snippet: String,
	pub explain: RetrievalExplain,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankResponse {
	pub matches: Vec<RankedMatch>,
	pub diagnostics: Diagnostics,
}

struct Scored {
	/// Key the raw hits were pooled under; the store record's own id is not trusted.
	candidate_id: String,
	record: CandidateRecord,
	similarity: f32,
	variants: Vec<VariantKind>,
	file_name: String,
	snippet: String,
	signals: RerankSignals,
	breakdown: Option<ScoreBreakdown>,
	final_score: f64,
}

/// Everything gathered before scoring, kept for diagnostics.
struct Trace {
	trace_id: Uuid,
	started_at: OffsetDateTime,
	intent: Intent,
	expanded_query: String,
	variants: Vec<VariantReport>,
	raw_hits: usize,
	unique_candidates: usize,
	stale_skipped: usize,
	warnings: Vec<String>,
}
impl Trace {
	fn finish(
		self,
		weighted: bool,
		weightage: ResolvedWeightage,
		degraded_candidates: Vec<String>,
		matches: &[RankedMatch],
	) -> Diagnostics {
		let scores: Vec<f64> = matches.iter().map(|item| item.final_score).collect();
		let mut warnings = self.warnings;

		warnings.extend(weightage.warnings);

		Diagnostics {
			trace_id: self.trace_id,
			started_at: self.started_at,
			finished_at: OffsetDateTime::now_utc(),
			intent: self.intent,
			expanded_query: self.expanded_query,
			variants: self.variants,
			raw_hits: self.raw_hits,
			unique_candidates: self.unique_candidates,
			stale_skipped: self.stale_skipped,
			degraded_candidates,
			weighted,
			weightage: weightage.parameters,
			weightage_origin: weightage.origin,
			warnings,
			quality: diagnostics::quality(
				&scores,
				matches.iter().map(|item| item.skills.as_slice()),
			),
		}
	}
}

impl RankingService {
	/// Ranks candidates for a hiring query.
	///
	/// Only a failed embedding call, or every variant query failing, is an error. No hits, an
	/// empty query, and `top_k == 0` all produce an empty list.
	pub async fn rank(&self, req: RankRequest) -> Result<RankResponse> {
		let started_at = OffsetDateTime::now_utc();
		let trace_id = Uuid::new_v4();
		let weightage = weightage::resolve(
			&self.cfg,
			self.collaborators.weightage.as_ref(),
			req.weightage,
			req.session_id.as_deref(),
		)
		.await;
		let query = req.query.trim();
		let intent = analyze(query, req.prior_context.as_deref());
		let mut trace = Trace {
			trace_id,
			started_at,
			intent,
			expanded_query: String::new(),
			variants: Vec::new(),
			raw_hits: 0,
			unique_candidates: 0,
			stale_skipped: 0,
			warnings: Vec::new(),
		};

		if text::tokenize(query).is_empty() {
			tracing::warn!(%trace_id, "Empty query; nothing to rank.");

			trace.warnings.push("Query is empty; no candidates were retrieved.".to_string());

			return Ok(RankResponse::empty(trace.finish(req.weighted, weightage, Vec::new(), &[])));
		}

		let top_k = self.effective_top_k(req.top_k, &mut trace.warnings);

		if top_k == 0 {
			trace.warnings.push("top_k is 0; no candidates were retrieved.".to_string());

			return Ok(RankResponse::empty(trace.finish(req.weighted, weightage, Vec::new(), &[])));
		}

		validate_filters(req.filters.as_ref())?;

		let expanded = expand_query(query);
		let variants =
			plan_variants(&expanded, &trace.intent, self.cfg.retrieval.max_variants as usize);
		let texts: Vec<String> = variants.iter().map(|variant| variant.text.clone()).collect();
		let vectors = self
			.collaborators
			.embedding
			.embed_batch(&self.cfg.providers.embedding, &texts)
			.await
			.map_err(|err| Error::RetrievalFailed {
				message: format!("Embedding variants failed: {err}"),
			})?;

		if vectors.len() != variants.len() {
			return Err(Error::RetrievalFailed {
				message: format!(
					"Embedding provider returned {} vectors for {} variants.",
					vectors.len(),
					variants.len()
				),
			});
		}

		let window = top_k.saturating_mul(self.cfg.retrieval.overfetch_factor.max(1));
		let retrieved = retrieval::retrieve(
			self.collaborators.index.clone(),
			&variants,
			vectors,
			RetrievalPlan {
				limit: window,
				filter: req.filters.clone(),
				timeout: Duration::from_millis(self.cfg.retrieval.variant_timeout_ms),
			},
		)
		.await;

		if retrieved.all_failed() {
			let reasons: Vec<String> = retrieved
				.reports
				.iter()
				.filter_map(|report| {
					report.error.as_ref().map(|err| format!("{:?}: {err}", report.kind))
				})
				.collect();

			return Err(Error::RetrievalFailed {
				message: format!("Every query variant failed. {}", reasons.join(" ")),
			});
		}

		trace.expanded_query = expanded;
		trace.raw_hits = retrieved.hits.len();
		trace.variants = retrieved.reports;

		let pooled = rerank::dedup(retrieved.hits);

		trace.unique_candidates = pooled.len();

		let scoring_ctx =
			ScoringContext::from_request(query, req.job_description.as_deref(), &self.cfg.scoring);
		let snippet_terms = assemble::snippet_terms(query);
		let mut scored = Vec::new();

		for candidate in pooled {
			if scored.len() == window as usize {
				break;
			}

			let record = match self.collaborators.store.find_by_id(&candidate.candidate_id).await {
				Ok(Some(record)) => record,
				Ok(None) => {
					tracing::debug!(
						candidate_id = %candidate.candidate_id,
						"Skipping stale candidate reference."
					);

					trace.stale_skipped += 1;

					continue;
				},
				Err(err) => {
					tracing::warn!(
						candidate_id = %candidate.candidate_id,
						error = %err,
						"Candidate store lookup failed; skipping."
					);

					trace.stale_skipped += 1;

					continue;
				},
			};
			let snippet = assemble::relevant_text(
				&record.full_text,
				&snippet_terms,
				self.cfg.snippet.max_chars,
			);
			let signals = rerank::signals(
				&self.cfg.rerank,
				candidate.max_similarity,
				&trace.intent.skill_terms,
				&record.skills,
				trace.intent.experience.years,
				&snippet,
			);
			let breakdown = (req.weighted || req.include_breakdown)
				.then(|| score_candidate(&record, &scoring_ctx, &weightage.parameters));
			let final_score = match (&breakdown, req.weighted) {
				(Some(breakdown), true) => breakdown.final_score,
				_ => signals.score.clamp(0.0, 1.0),
			};
			let file_name = if record.file_name.is_empty() {
				candidate
					.metadata
					.get("file_name")
					.and_then(Value::as_str)
					.unwrap_or_default()
					.to_string()
			} else {
				record.file_name.clone()
			};

			scored.push(Scored {
				candidate_id: candidate.candidate_id,
				record,
				similarity: candidate.max_similarity,
				variants: candidate.variants,
				file_name,
				snippet,
				signals,
				breakdown,
				final_score,
			});
		}

		scored.sort_by(|a, b| {
			rerank::compare_ranked(
				(a.final_score, a.signals.score, a.candidate_id.as_str()),
				(b.final_score, b.signals.score, b.candidate_id.as_str()),
			)
		});
		scored.truncate(top_k as usize);

		let degraded = scored
			.iter()
			.filter(|item| item.breakdown.as_ref().is_some_and(ScoreBreakdown::is_degraded))
			.map(|item| item.candidate_id.clone())
			.collect();
		let matches: Vec<RankedMatch> =
			scored.into_iter().map(|item| item.into_match(req.include_breakdown)).collect();

		tracing::info!(
			%trace_id,
			variants = trace.variants.len(),
			raw_hits = trace.raw_hits,
			unique = trace.unique_candidates,
			stale = trace.stale_skipped,
			returned = matches.len(),
			"Ranked candidates."
		);

		let diagnostics = trace.finish(req.weighted, weightage, degraded, &matches);

		Ok(RankResponse { matches, diagnostics })
	}

	fn effective_top_k(&self, requested: Option<u32>, warnings: &mut Vec<String>) -> u32 {
		let retrieval = &self.cfg.retrieval;
		let requested = requested.unwrap_or(retrieval.default_top_k);

		if requested > retrieval.max_top_k {
			warnings.push(format!(
				"top_k {requested} exceeds the maximum of {}; clamped.",
				retrieval.max_top_k
			));

			return retrieval.max_top_k;
		}

		requested
	}
}

impl RankResponse {
	fn empty(diagnostics: Diagnostics) -> Self {
		Self { matches: Vec::new(), diagnostics }
	}
}

impl Scored {
	fn into_match(self, include_breakdown: bool) -> RankedMatch {
		RankedMatch {
			candidate_id: self.candidate_id,
			file_name: self.file_name,
			final_score: self.final_score,
			breakdown: if include_breakdown { self.breakdown } else { None },
			name: self.record.name,
			skills: self.record.skills,
			summary: self.record.summary,
			snippet: self.snippet,
			explain: RetrievalExplain {
				max_similarity: self.similarity,
				alignment_bonus: self.signals.alignment,
				recency_bonus: self.signals.recency,
				rerank_score: self.signals.score,
				variants: self.variants,
			},
		}
	}
}

/// Rejects filters the similarity index could not apply, before any embedding call.
fn validate_filters(filters: Option<&PayloadFilter>) -> Result<()> {
	let Some(filters) = filters else {
		return Ok(());
	};

	models::check_filter(filters)
		.map_err(|err| Error::InvalidRequest { message: err.to_string() })
}
