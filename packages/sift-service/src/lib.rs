pub mod search;
pub mod weightage;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

pub use error::{Error, Result};
pub use search::{
	Diagnostics, QualityReport, QueryVariant, RankRequest, RankResponse, RankedMatch,
	RetrievalExplain, ScoreHistogram, SkillCount, SkillDistribution, VariantKind, VariantReport,
};
pub use weightage::{InMemoryWeightageStore, ResolvedWeightage, WeightageOrigin};

use color_eyre::eyre;

use sift_config::{Config, EmbeddingProviderConfig};
use sift_domain::{CandidateRecord, WeightageParameters};
use sift_providers::embedding;
use sift_storage::{
	candidates::JsonCandidateStore,
	memory::MemoryIndex,
	models::{IndexHit, PayloadFilter},
	qdrant::QdrantStore,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	/// One vector per input text, in input order.
	fn embed_batch<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;

	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(async move {
			let texts = [text.to_string()];
			let mut vectors = self.embed_batch(cfg, &texts).await?;

			match vectors.pop() {
				Some(vector) if vectors.is_empty() => Ok(vector),
				_ => Err(eyre::eyre!("Embedding provider must return exactly one vector.")),
			}
		})
	}
}

pub trait SimilarityIndex
where
	Self: Send + Sync,
{
	/// Up to `top_k` hits ordered by descending similarity, each score in `0.0..=1.0`.
	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		top_k: u32,
		filter: Option<&'a PayloadFilter>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<IndexHit>>>;
}

pub trait CandidateStore
where
	Self: Send + Sync,
{
	/// `Ok(None)` when the id is unknown to the store.
	fn find_by_id<'a>(
		&'a self,
		id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<CandidateRecord>>>;
}

pub trait WeightageSource
where
	Self: Send + Sync,
{
	/// Session weightage when one is stored for `session_id`, else the stored global default.
	/// `None` asks for the global default alone.
	fn get_weightage<'a>(
		&'a self,
		session_id: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<Option<WeightageParameters>>>;
}

#[derive(Clone)]
pub struct Collaborators {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub index: Arc<dyn SimilarityIndex>,
	pub store: Arc<dyn CandidateStore>,
	pub weightage: Arc<dyn WeightageSource>,
}
impl Collaborators {
	/// Wires the HTTP embedding provider and an empty weightage store around `index` and `store`.
	pub fn with_defaults(index: Arc<dyn SimilarityIndex>, store: Arc<dyn CandidateStore>) -> Self {
		Self {
			embedding: Arc::new(HttpEmbedding),
			index,
			store,
			weightage: Arc::new(InMemoryWeightageStore::default()),
		}
	}
}

pub struct RankingService {
	pub cfg: Config,
	pub collaborators: Collaborators,
}
impl RankingService {
	pub fn new(cfg: Config, collaborators: Collaborators) -> Self {
		Self { cfg, collaborators }
	}
}

pub struct HttpEmbedding;
impl EmbeddingProvider for HttpEmbedding {
	fn embed_batch<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed_batch(cfg, texts).await?) })
	}

	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, text).await?) })
	}
}

impl SimilarityIndex for QdrantStore {
	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		top_k: u32,
		filter: Option<&'a PayloadFilter>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<IndexHit>>> {
		Box::pin(async move { Ok(QdrantStore::query(self, vector, top_k, filter).await?) })
	}
}

impl SimilarityIndex for MemoryIndex {
	fn query<'a>(
		&'a self,
		vector: &'a [f32],
		top_k: u32,
		filter: Option<&'a PayloadFilter>,
	) -> BoxFuture<'a, color_eyre::Result<Vec<IndexHit>>> {
		Box::pin(async move { Ok(MemoryIndex::query(self, vector, top_k, filter)?) })
	}
}

impl CandidateStore for JsonCandidateStore {
	fn find_by_id<'a>(
		&'a self,
		id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<CandidateRecord>>> {
		let record = JsonCandidateStore::find_by_id(self, id).cloned();

		Box::pin(async move { Ok(record) })
	}
}
