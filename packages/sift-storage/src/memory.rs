use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::{
	Error, Result,
	models::{self, IndexHit, PayloadFilter},
};

struct Entry {
	candidate_id: String,
	vector: Vec<f32>,
	norm: f32,
	metadata: Map<String, Value>,
}

/// Flat cosine-similarity index held in process memory.
pub struct MemoryIndex {
	dimensions: usize,
	entries: Vec<Entry>,
}
impl MemoryIndex {
	pub fn new(dimensions: u32) -> Self {
		Self { dimensions: dimensions as usize, entries: Vec::new() }
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn insert(
		&mut self,
		candidate_id: impl Into<String>,
		vector: Vec<f32>,
		metadata: Map<String, Value>,
	) -> Result<()> {
		self.check_dimensions(&vector)?;

		let norm = l2_norm(&vector);

		self.entries.push(Entry { candidate_id: candidate_id.into(), vector, norm, metadata });

		Ok(())
	}

	/// Best `limit` entries by cosine similarity. Negative similarity is reported as 0.
	pub fn query(
		&self,
		vector: &[f32],
		limit: u32,
		filter: Option<&PayloadFilter>,
	) -> Result<Vec<IndexHit>> {
		self.check_dimensions(vector)?;

		let query_norm = l2_norm(vector);
		let mut hits: Vec<IndexHit> = self
			.entries
			.iter()
			.filter(|entry| {
				filter.map(|filter| models::payload_matches(&entry.metadata, filter)).unwrap_or(true)
			})
			.map(|entry| {
				let similarity = cosine(vector, query_norm, &entry.vector, entry.norm);

				IndexHit {
					candidate_id: entry.candidate_id.clone(),
					score: models::clamp_similarity(similarity),
					metadata: entry.metadata.clone(),
				}
			})
			.collect();

		hits.sort_by(|a, b| {
			b.score
				.partial_cmp(&a.score)
				.unwrap_or(Ordering::Equal)
				.then_with(|| a.candidate_id.cmp(&b.candidate_id))
		});
		hits.truncate(limit as usize);

		Ok(hits)
	}

	fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
		if vector.len() != self.dimensions {
			return Err(Error::InvalidArgument(format!(
				"Vector has {} dimensions; index expects {}.",
				vector.len(),
				self.dimensions
			)));
		}

		Ok(())
	}
}

fn l2_norm(vector: &[f32]) -> f32 {
	vector.iter().map(|value| value * value).sum::<f32>().sqrt()
}

fn cosine(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
	if a_norm == 0.0 || b_norm == 0.0 {
		return 0.0;
	}

	let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();

	dot / (a_norm * b_norm)
}
