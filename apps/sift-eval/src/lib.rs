use std::{
	collections::HashSet,
	fs,
	path::{Path, PathBuf},
	sync::Arc,
	time::Instant,
};

use clap::{Parser, ValueEnum};
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use sift_config::Config;
use sift_domain::{CandidateRecord, WeightageParameters};
use sift_service::{
	Collaborators, EmbeddingProvider, HttpEmbedding, RankRequest, RankingService, SimilarityIndex,
};
use sift_storage::{
	candidates::JsonCandidateStore, memory::MemoryIndex, models::PayloadFilter, qdrant::QdrantStore,
};

const EMBED_BATCH: usize = 32;

#[derive(Debug, Parser)]
#[command(
	version = sift_cli::VERSION,
	rename_all = "kebab",
	styles = sift_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON array of candidate records.
	#[arg(long, value_name = "FILE")]
	pub candidates: PathBuf,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
	#[arg(long)]
	pub weighted: bool,
	#[arg(long, value_enum, default_value_t = IndexKind::Memory)]
	pub index: IndexKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
	Qdrant,
	/// Embed every candidate up front and search in process.
	Memory,
}

#[derive(Debug, Deserialize)]
struct EvalDataset {
	name: Option<String>,
	#[serde(default)]
	defaults: EvalDefaults,
	queries: Vec<EvalQuery>,
}

#[derive(Debug, Default, Deserialize, Clone)]
struct EvalDefaults {
	top_k: Option<u32>,
	weighted: Option<bool>,
	job_description: Option<String>,
	weightage: Option<WeightageParameters>,
	filters: Option<PayloadFilter>,
}

#[derive(Debug, Deserialize)]
struct EvalQuery {
	id: Option<String>,
	query: String,
	job_description: Option<String>,
	top_k: Option<u32>,
	weightage: Option<WeightageParameters>,
	filters: Option<PayloadFilter>,
	expected_candidate_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EvalOutput {
	dataset: EvalDatasetInfo,
	settings: EvalSettings,
	summary: EvalSummary,
	queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
struct EvalDatasetInfo {
	name: String,
	query_count: usize,
	candidate_count: usize,
}

#[derive(Debug, Clone, Serialize)]
struct EvalSettings {
	config_path: String,
	index: IndexKind,
	top_k: u32,
	weighted: bool,
}

#[derive(Debug, Serialize)]
struct EvalSummary {
	avg_recall_at_k: f64,
	avg_precision_at_k: f64,
	mean_rr: f64,
	mean_ndcg: f64,
	latency_ms_p50: f64,
	latency_ms_p95: f64,
}

#[derive(Debug, Serialize)]
struct QueryReport {
	id: String,
	query: String,
	trace_id: Uuid,
	expected_count: usize,
	retrieved_count: usize,
	relevant_count: usize,
	recall_at_k: f64,
	precision_at_k: f64,
	rr: f64,
	ndcg: f64,
	latency_ms: f64,
	expected_candidate_ids: Vec<String>,
	retrieved_candidate_ids: Vec<String>,
	warnings: Vec<String>,
}

struct Metrics {
	recall_at_k: f64,
	precision_at_k: f64,
	rr: f64,
	ndcg: f64,
	relevant_count: usize,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = sift_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let dataset = load_dataset(&args.dataset)?;
	let store = JsonCandidateStore::from_path(&args.candidates)?;
	let candidate_count = store.len();
	let index: Arc<dyn SimilarityIndex> = match args.index {
		IndexKind::Qdrant => Arc::new(QdrantStore::new(&config.storage.qdrant)?),
		IndexKind::Memory => Arc::new(build_memory_index(&HttpEmbedding, &config, &store).await?),
	};
	let settings = EvalSettings {
		config_path: args.config.display().to_string(),
		index: args.index,
		top_k: args
			.top_k
			.or(dataset.defaults.top_k)
			.unwrap_or(config.retrieval.default_top_k),
		weighted: args.weighted || dataset.defaults.weighted.unwrap_or(false),
	};
	let service = RankingService::new(config, Collaborators::with_defaults(index, Arc::new(store)));
	let output = evaluate(&service, &dataset, settings, candidate_count).await?;
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;

	parse_dataset(&raw)
}

fn parse_dataset(raw: &str) -> color_eyre::Result<EvalDataset> {
	let dataset: EvalDataset = serde_json::from_str(raw)?;

	if dataset.queries.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one query."));
	}

	Ok(dataset)
}

/// Embeds every stored candidate and loads the vectors into a [`MemoryIndex`].
///
/// The full resume text is embedded when present, otherwise the profile text. `file_name` and
/// `name` are kept as payload so filters behave as they do against Qdrant.
async fn build_memory_index(
	embedding: &dyn EmbeddingProvider,
	cfg: &Config,
	store: &JsonCandidateStore,
) -> color_eyre::Result<MemoryIndex> {
	let records = store.records();
	let mut index = MemoryIndex::new(cfg.storage.qdrant.vector_dim);

	for chunk in records.chunks(EMBED_BATCH) {
		let texts: Vec<String> = chunk.iter().map(|record| index_text(record)).collect();
		let vectors = embedding.embed_batch(&cfg.providers.embedding, &texts).await?;

		if vectors.len() != chunk.len() {
			return Err(eyre::eyre!(
				"Embedding provider returned {} vectors for {} candidates.",
				vectors.len(),
				chunk.len()
			));
		}

		for (record, vector) in chunk.iter().zip(vectors) {
			index.insert(record.id.clone(), vector, payload(record))?;
		}
	}

	tracing::info!(candidates = index.len(), "Built in-memory candidate index.");

	Ok(index)
}

fn index_text(record: &CandidateRecord) -> String {
	if record.full_text.trim().is_empty() { record.profile_text() } else { record.full_text.clone() }
}

fn payload(record: &CandidateRecord) -> Map<String, Value> {
	let mut payload = Map::new();

	payload.insert("file_name".to_string(), Value::String(record.file_name.clone()));
	payload.insert("name".to_string(), Value::String(record.name.clone()));

	payload
}

async fn evaluate(
	service: &RankingService,
	dataset: &EvalDataset,
	settings: EvalSettings,
	candidate_count: usize,
) -> color_eyre::Result<EvalOutput> {
	let mut reports = Vec::with_capacity(dataset.queries.len());
	let mut latencies_ms = Vec::with_capacity(dataset.queries.len());

	for (position, query) in dataset.queries.iter().enumerate() {
		let id = query.id.clone().unwrap_or_else(|| format!("query-{}", position + 1));
		let request = RankRequest {
			query: query.query.clone(),
			job_description: query
				.job_description
				.clone()
				.or_else(|| dataset.defaults.job_description.clone()),
			top_k: Some(query.top_k.unwrap_or(settings.top_k)),
			filters: query.filters.clone().or_else(|| dataset.defaults.filters.clone()),
			weightage: query.weightage.or(dataset.defaults.weightage),
			weighted: settings.weighted,
			..RankRequest::default()
		};
		let start = Instant::now();
		let response = service.rank(request).await?;
		let latency_ms = start.elapsed().as_secs_f64() * 1_000.0;
		let retrieved =
			unique_ids(response.matches.iter().map(|item| item.candidate_id.clone()));
		let expected: HashSet<String> = query.expected_candidate_ids.iter().cloned().collect();
		let metrics = compute_metrics(&retrieved, &expected);

		tracing::debug!(query_id = %id, latency_ms, rr = metrics.rr, "Evaluated query.");

		reports.push(QueryReport {
			id,
			query: query.query.clone(),
			trace_id: response.diagnostics.trace_id,
			expected_count: expected.len(),
			retrieved_count: retrieved.len(),
			relevant_count: metrics.relevant_count,
			recall_at_k: metrics.recall_at_k,
			precision_at_k: metrics.precision_at_k,
			rr: metrics.rr,
			ndcg: metrics.ndcg,
			latency_ms,
			expected_candidate_ids: query.expected_candidate_ids.clone(),
			retrieved_candidate_ids: retrieved,
			warnings: response.diagnostics.warnings,
		});
		latencies_ms.push(latency_ms);
	}

	let summary = summarize(&reports, &latencies_ms);

	tracing::info!(
		queries = reports.len(),
		mean_rr = summary.mean_rr,
		mean_ndcg = summary.mean_ndcg,
		"Evaluation finished."
	);

	Ok(EvalOutput {
		dataset: EvalDatasetInfo {
			name: dataset.name.clone().unwrap_or_else(|| "eval".to_string()),
			query_count: reports.len(),
			candidate_count,
		},
		settings,
		summary,
		queries: reports,
	})
}

fn unique_ids<I>(iter: I) -> Vec<String>
where
	I: Iterator<Item = String>,
{
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for id in iter {
		if seen.insert(id.clone()) {
			out.push(id);
		}
	}

	out
}

fn compute_metrics(retrieved: &[String], expected: &HashSet<String>) -> Metrics {
	let expected_count = expected.len();
	let mut relevant_count = 0_usize;
	let mut dcg = 0.0_f64;
	let mut first_hit: Option<usize> = None;

	for (idx, id) in retrieved.iter().enumerate() {
		if !expected.contains(id) {
			continue;
		}

		let rank = idx + 1;

		relevant_count += 1;
		dcg += 1.0 / (rank as f64 + 1.0).log2();
		first_hit.get_or_insert(rank);
	}

	let idcg: f64 = (1..=expected_count.min(retrieved.len()))
		.map(|rank| 1.0 / (rank as f64 + 1.0).log2())
		.sum();
	let rr = first_hit.map(|rank| 1.0 / rank as f64).unwrap_or(0.0);
	let ndcg = if idcg > 0.0 { dcg / idcg } else { 0.0 };
	let precision_at_k =
		if retrieved.is_empty() { 0.0 } else { relevant_count as f64 / retrieved.len() as f64 };
	let recall_at_k =
		if expected_count == 0 { 0.0 } else { relevant_count as f64 / expected_count as f64 };

	Metrics { recall_at_k, precision_at_k, rr, ndcg, relevant_count }
}

fn summarize(reports: &[QueryReport], latencies_ms: &[f64]) -> EvalSummary {
	let count = reports.len().max(1) as f64;
	let mut sorted = latencies_ms.to_vec();

	sorted.sort_by(f64::total_cmp);

	EvalSummary {
		avg_recall_at_k: reports.iter().map(|r| r.recall_at_k).sum::<f64>() / count,
		avg_precision_at_k: reports.iter().map(|r| r.precision_at_k).sum::<f64>() / count,
		mean_rr: reports.iter().map(|r| r.rr).sum::<f64>() / count,
		mean_ndcg: reports.iter().map(|r| r.ndcg).sum::<f64>() / count,
		latency_ms_p50: percentile(&sorted, 0.50),
		latency_ms_p95: percentile(&sorted, 0.95),
	}
}

/// Linear interpolation between closest ranks; `values` must be sorted.
fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let pos = percentile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;

	if lower == upper {
		values[lower]
	} else {
		let weight = pos - lower as f64;

		values[lower] * (1.0 - weight) + values[upper] * weight
	}
}
