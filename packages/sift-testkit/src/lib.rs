//! Deterministic collaborators and fixtures for exercising the ranking service without network
//! services.

use std::{
	collections::{HashSet, hash_map::DefaultHasher},
	hash::{Hash, Hasher},
	sync::{
		Arc, Mutex, PoisonError,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use color_eyre::eyre;
use serde_json::{Map, Value};

use sift_config::{
	Config, EmbeddingProviderConfig, Providers, Qdrant, Rerank, Retrieval, Scoring, Service,
	Snippet, Storage, Weightage,
};
use sift_domain::{CandidateRecord, text};
use sift_service::{
	BoxFuture, CandidateStore, Collaborators, EmbeddingProvider, InMemoryWeightageStore,
	SimilarityIndex,
};
use sift_storage::{
	candidates::JsonCandidateStore,
	models::{self, IndexHit, PayloadFilter},
};

pub const TEST_DIMENSIONS: u32 = 64;

pub fn test_config() -> Config {
	Config {
		service: Service { log_level: "debug".to_string() },
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:9".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "hashing".to_string(),
				dimensions: TEST_DIMENSIONS,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		storage: Storage {
			qdrant: Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				collection: "candidates_test".to_string(),
				vector_dim: TEST_DIMENSIONS,
				candidate_id_field: "candidate_id".to_string(),
			},
		},
		retrieval: Retrieval { variant_timeout_ms: 200, ..Retrieval::default() },
		rerank: Rerank::default(),
		scoring: Scoring::default(),
		weightage: Weightage::default(),
		snippet: Snippet::default(),
	}
}

/// Bag-of-words vector: each token bumps one hashed bucket, then the vector is L2-normalized.
pub fn hashed_vector(input: &str, dimensions: u32) -> Vec<f32> {
	let dimensions = (dimensions as usize).max(1);
	let mut vector = vec![0.0_f32; dimensions];

	for token in text::tokenize(input) {
		let mut hasher = DefaultHasher::new();

		token.hash(&mut hasher);

		vector[(hasher.finish() % dimensions as u64) as usize] += 1.0;
	}

	let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm > 0.0 {
		for value in &mut vector {
			*value /= norm;
		}
	}

	vector
}

/// Embeds with [`hashed_vector`] and counts batch calls.
#[derive(Clone, Default)]
pub struct HashingEmbedding {
	batches: Arc<AtomicUsize>,
}
impl HashingEmbedding {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn batches(&self) -> usize {
		self.batches.load(Ordering::SeqCst)
	}
}
impl EmbeddingProvider for HashingEmbedding {
	fn embed_batch<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		self.batches.fetch_add(1, Ordering::SeqCst);

		let vectors = texts.iter().map(|text| hashed_vector(text, cfg.dimensions)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed_batch<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Err(eyre::eyre!("Embedding endpoint unavailable.")) })
	}
}

#[derive(Clone)]
enum Script {
	Hits(Vec<IndexHit>),
	Fail(String),
	Stall(Duration),
}

/// Similarity index that answers per query text.
///
/// Query vectors are matched against [`hashed_vector`] of each scripted text, so it pairs with
/// [`HashingEmbedding`]. Unscripted queries get `otherwise`, which defaults to no hits.
pub struct ScriptedIndex {
	dimensions: u32,
	scripts: Vec<(Vec<f32>, Script)>,
	otherwise: Script,
	calls: AtomicUsize,
	limits: Mutex<Vec<u32>>,
}
impl ScriptedIndex {
	pub fn new() -> Self {
		Self {
			dimensions: TEST_DIMENSIONS,
			scripts: Vec::new(),
			otherwise: Script::Hits(Vec::new()),
			calls: AtomicUsize::new(0),
			limits: Mutex::new(Vec::new()),
		}
	}

	pub fn with_hits(mut self, query: &str, hits: Vec<IndexHit>) -> Self {
		self.script(query, Script::Hits(hits));

		self
	}

	pub fn with_failure(mut self, query: &str, message: &str) -> Self {
		self.script(query, Script::Fail(message.to_string()));

		self
	}

	/// Answers `query` only after `delay`.
	pub fn with_stall(mut self, query: &str, delay: Duration) -> Self {
		self.script(query, Script::Stall(delay));

		self
	}

	pub fn otherwise_hits(mut self, hits: Vec<IndexHit>) -> Self {
		self.otherwise = Script::Hits(hits);

		self
	}

	pub fn otherwise_fail(mut self, message: &str) -> Self {
		self.otherwise = Script::Fail(message.to_string());

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// `top_k` of every query received, in arrival order.
	pub fn limits(&self) -> Vec<u32> {
		self.limits.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}

	fn script(&mut self, query: &str, script: Script) {
		self.scripts.push((hashed_vector(query, self.dimensions), script));
	}
}
impl Default for ScriptedIndex {
	fn default() -> Self {
		Self::new()
	}
}
impl SimilarityIndex for ScriptedIndex {
	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		top_k: u32,
		filter: Option<&'a PayloadFilter>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<IndexHit>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.limits.lock().unwrap_or_else(PoisonError::into_inner).push(top_k);

		let script = self
			.scripts
			.iter()
			.find(|(scripted, _)| scripted.as_slice() == vector)
			.map(|(_, script)| script.clone())
			.unwrap_or_else(|| self.otherwise.clone());

		Box::pin(async move {
			match script {
				Script::Hits(hits) => Ok(hits
					.into_iter()
					.filter(|hit| {
						filter.is_none_or(|filter| models::payload_matches(&hit.metadata, filter))
					})
					.take(top_k as usize)
					.collect()),
				Script::Fail(message) => Err(eyre::eyre!(message)),
				Script::Stall(delay) => {
					tokio::time::sleep(delay).await;

					Ok(Vec::new())
				},
			}
		})
	}
}

/// Candidate store whose lookups fail for selected ids.
pub struct FlakyStore {
	inner: JsonCandidateStore,
	failing: HashSet<String>,
}
impl FlakyStore {
	pub fn new(inner: JsonCandidateStore, failing: &[&str]) -> Self {
		Self { inner, failing: failing.iter().map(|id| id.to_string()).collect() }
	}
}
impl CandidateStore for FlakyStore {
	fn find_by_id<'a>(
		&'a self,
		id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<CandidateRecord>>> {
		let found = if self.failing.contains(id) {
			Err(eyre::eyre!("Candidate store timed out for {id}."))
		} else {
			Ok(self.inner.find_by_id(id).cloned())
		};

		Box::pin(async move { found })
	}
}

pub fn hit(candidate_id: &str, score: f32) -> IndexHit {
	IndexHit { candidate_id: candidate_id.to_string(), score, metadata: Map::new() }
}

pub fn hit_with(candidate_id: &str, score: f32, metadata: Value) -> IndexHit {
	IndexHit {
		candidate_id: candidate_id.to_string(),
		score,
		metadata: metadata.as_object().cloned().unwrap_or_default(),
	}
}

pub fn store(records: Vec<CandidateRecord>) -> sift_storage::Result<JsonCandidateStore> {
	JsonCandidateStore::from_records(records)
}

/// Collaborators around `index` and `store` with hashing embeddings and an empty weightage store.
pub fn collaborators(
	index: Arc<dyn SimilarityIndex>,
	store: Arc<dyn CandidateStore>,
) -> Collaborators {
	Collaborators {
		embedding: Arc::new(HashingEmbedding::new()),
		index,
		store,
		weightage: Arc::new(InMemoryWeightageStore::default()),
	}
}

pub struct CandidateBuilder {
	record: CandidateRecord,
}
impl CandidateBuilder {
	pub fn name(mut self, name: &str) -> Self {
		self.record.name = name.to_string();

		self
	}

	pub fn file_name(mut self, file_name: &str) -> Self {
		self.record.file_name = file_name.to_string();

		self
	}

	pub fn skills(mut self, skills: &[&str]) -> Self {
		self.record.skills = strings(skills);

		self
	}

	pub fn experience(mut self, entries: &[&str]) -> Self {
		self.record.experience = strings(entries);

		self
	}

	pub fn education(mut self, entries: &[&str]) -> Self {
		self.record.education = strings(entries);

		self
	}

	pub fn summary(mut self, summary: &str) -> Self {
		self.record.summary = summary.to_string();

		self
	}

	pub fn full_text(mut self, full_text: &str) -> Self {
		self.record.full_text = full_text.to_string();

		self
	}

	pub fn build(self) -> CandidateRecord {
		self.record
	}
}

pub fn candidate(id: &str) -> CandidateBuilder {
	CandidateBuilder { record: CandidateRecord { id: id.to_string(), ..CandidateRecord::default() } }
}

fn strings(items: &[&str]) -> Vec<String> {
	items.iter().map(|item| item.to_string()).collect()
}
