use std::{sync::Arc, time::Duration};

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::task::JoinSet;

use sift_storage::models::{IndexHit, PayloadFilter};

use crate::{
	SimilarityIndex,
	search::strategy::{QueryVariant, VariantKind},
};

/// One index hit tagged with the variant that surfaced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
	pub candidate_id: String,
	pub score: f32,
	pub metadata: Map<String, Value>,
	pub variant: VariantKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantReport {
	pub kind: VariantKind,
	pub text: String,
	pub hits: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

pub(crate) struct Retrieved {
	pub(crate) hits: Vec<RawHit>,
	pub(crate) reports: Vec<VariantReport>,
}
impl Retrieved {
	pub(crate) fn all_failed(&self) -> bool {
		self.reports.iter().all(|report| report.error.is_some())
	}
}

pub(crate) struct RetrievalPlan {
	pub(crate) limit: u32,
	pub(crate) filter: Option<PayloadFilter>,
	pub(crate) timeout: Duration,
}

/// Queries the index once per variant, concurrently.
///
/// A failed or timed-out variant contributes no hits. Results are merged in variant order, so
/// completion order never changes the pool.
pub(crate) async fn retrieve(
	index: Arc<dyn SimilarityIndex>,
	variants: &[QueryVariant],
	vectors: Vec<Vec<f32>>,
	plan: RetrievalPlan,
) -> Retrieved {
	let filter = plan.filter.map(Arc::new);
	let mut tasks = JoinSet::new();

	for (position, vector) in vectors.into_iter().enumerate() {
		let index = index.clone();
		let filter = filter.clone();
		let limit = plan.limit;
		let timeout = plan.timeout;

		tasks.spawn(async move {
			let query = index.query(&vector, limit, filter.as_deref());
			let outcome = match tokio::time::timeout(timeout, query).await {
				Ok(Ok(hits)) => Ok(hits),
				Ok(Err(err)) => Err(err.to_string()),
				Err(_) => Err(format!("Timed out after {} ms.", timeout.as_millis())),
			};

			(position, outcome)
		});
	}

	let mut outcomes: Vec<Option<Result<Vec<IndexHit>, String>>> = vec![None; variants.len()];

	while let Some(joined) = tasks.join_next().await {
		match joined {
			Ok((position, outcome)) =>
				if let Some(slot) = outcomes.get_mut(position) {
					*slot = Some(outcome);
				},
			Err(err) => tracing::warn!(error = %err, "Variant retrieval task aborted."),
		}
	}

	let mut hits = Vec::new();
	let mut reports = Vec::with_capacity(variants.len());

	for (variant, outcome) in variants.iter().zip(outcomes) {
		let outcome =
			outcome.unwrap_or_else(|| Err("Retrieval task did not complete.".to_string()));
		let report = match outcome {
			Ok(found) => {
				let count = found.len();

				hits.extend(found.into_iter().map(|hit| RawHit {
					candidate_id: hit.candidate_id,
					score: hit.score,
					metadata: hit.metadata,
					variant: variant.kind,
				}));

				VariantReport {
					kind: variant.kind,
					text: variant.text.clone(),
					hits: count,
					error: None,
				}
			},
			Err(err) => {
				tracing::warn!(variant = ?variant.kind, error = %err, "Variant retrieval failed.");

				VariantReport {
					kind: variant.kind,
					text: variant.text.clone(),
					hits: 0,
					error: Some(err),
				}
			},
		};

		reports.push(report);
	}

	Retrieved { hits, reports }
}
