use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use sift_config::EmbeddingProviderConfig;

use crate::{Error, Result};

pub async fn embed(cfg: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let mut vectors = embed_batch(cfg, &[text.to_string()]).await?;

	match vectors.pop() {
		Some(vector) if vectors.is_empty() => Ok(vector),
		_ => Err(Error::InvalidResponse {
			message: "Embedding provider must return exactly one vector.".to_string(),
		}),
	}
}

/// Embeds `texts` through an OpenAI-compatible `/embeddings` endpoint.
///
/// Output order follows input order. Every vector is checked against the configured dimension.
pub async fn embed_batch(
	cfg: &EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = parse_embedding_response(json)?;

	if vectors.len() != texts.len() {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding provider returned {} vectors for {} inputs.",
				vectors.len(),
				texts.len()
			),
		});
	}

	check_dimensions(&vectors, cfg.dimensions)?;

	tracing::debug!(inputs = texts.len(), model = %cfg.model, "Embedded batch.");

	Ok(vectors)
}

fn check_dimensions(vectors: &[Vec<f32>], dimensions: u32) -> Result<()> {
	for vector in vectors {
		if vector.len() != dimensions as usize {
			return Err(Error::InvalidResponse {
				message: format!(
					"Embedding dimension {} does not match configured {dimensions}.",
					vector.len()
				),
			});
		}
	}

	Ok(())
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| Error::InvalidResponse {
		message: "Embedding response is missing data array.".to_string(),
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse { message: "Embedding item missing embedding array.".to_string() }
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
